//! Unit tests for document assembly.
//!
//! Tests cover:
//! - The reference three-node scenario
//! - Empty graph
//! - Edge list completeness and display copies

use neoforest::export::ExportDocument;
use neoforest::{ContainmentEdge, Edge, ForestBuilder, NodeRecord, PropertyMap};
use serde_json::json;

fn named(id: i64, name: &str) -> NodeRecord {
    NodeRecord::new(id, PropertyMap::new().with("name", name))
}

#[test]
fn test_reference_scenario() {
    let forest = ForestBuilder::new()
        .build(
            vec![named(1, "A"), named(2, "B"), named(3, "C")],
            &[ContainmentEdge::new(1, 2)],
        )
        .unwrap();
    let edges = vec![Edge::new(1, 3, "REFERS", PropertyMap::new())];

    let document = ExportDocument::new(forest, edges);
    assert_eq!(
        document.to_json().unwrap(),
        json!({
            "nodes": [
                {
                    "id": 1,
                    "name": "A",
                    "children": [
                        { "id": 2, "name": "B", "children": [] }
                    ]
                },
                { "id": 3, "name": "C", "children": [] }
            ],
            "edges": [
                { "fromId": 1, "toId": 3, "type": "REFERS", "displayFromId": 1, "displayToId": 3 }
            ]
        })
    );
}

#[test]
fn test_empty_graph() {
    let forest = ForestBuilder::new().build(Vec::new(), &[]).unwrap();
    let document = ExportDocument::new(forest, Vec::new());
    assert_eq!(document.to_json().unwrap(), json!({ "nodes": [], "edges": [] }));
}

#[test]
fn test_parallel_edges_all_kept() {
    let forest = ForestBuilder::new()
        .build(vec![named(1, "A"), named(2, "B")], &[])
        .unwrap();
    let edges = vec![
        Edge::new(1, 2, "LINKS", PropertyMap::new().with("weight", 1i64)),
        Edge::new(1, 2, "LINKS", PropertyMap::new().with("weight", 1i64)),
        Edge::new(2, 1, "LINKS", PropertyMap::new()),
    ];

    let value = ExportDocument::new(forest, edges.clone()).to_json().unwrap();
    let exported = value["edges"].as_array().unwrap();
    assert_eq!(exported.len(), edges.len());

    for (record, edge) in exported.iter().zip(&edges) {
        assert_eq!(record["fromId"], json!(edge.from_id));
        assert_eq!(record["toId"], json!(edge.to_id));
        assert_eq!(record["type"], json!(edge.rel_type));
        assert_eq!(record["displayFromId"], record["fromId"]);
        assert_eq!(record["displayToId"], record["toId"]);
    }
}

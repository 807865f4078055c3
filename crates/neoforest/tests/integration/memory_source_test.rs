//! Integration tests for the in-memory source.
//!
//! Tests cover:
//! - The three result sets split by relationship type
//! - Sessions are released on success and on every failure path

use neoforest::source::{fetch_snapshot, QueryKind};
use neoforest::{
    export_graph, ContainmentEdge, ExportError, ExportOptions, GraphSource, MemorySource,
    PropertyMap, PropertyValue,
};
use tempfile::TempDir;

fn sample() -> MemorySource {
    MemorySource::new()
        .with_node(10, PropertyMap::new().with("name", "site"))
        .with_node(11, PropertyMap::new().with("name", "rack"))
        .with_node(12, PropertyMap::new().with("name", "server"))
        .with_edge(10, 11, "CONTAINS", PropertyMap::new())
        .with_edge(11, 12, "CONTAINS", PropertyMap::new())
        .with_edge(12, 10, "REPORTS_TO", PropertyMap::new().with("weight", 0.5))
}

#[test]
fn test_snapshot_splits_relationships() {
    let source = sample();
    let snapshot = fetch_snapshot(&source, "CONTAINS").unwrap();

    assert_eq!(snapshot.nodes.len(), 3);
    assert_eq!(
        snapshot.containment,
        vec![ContainmentEdge::new(10, 11), ContainmentEdge::new(11, 12)]
    );
    assert_eq!(snapshot.edges.len(), 1);
    assert_eq!(snapshot.edges[0].rel_type, "REPORTS_TO");
    assert_eq!(
        snapshot.edges[0].get_property("weight"),
        Some(&PropertyValue::Float(0.5))
    );
}

#[test]
fn test_containment_type_is_configurable() {
    let source = sample();
    let snapshot = fetch_snapshot(&source, "REPORTS_TO").unwrap();

    assert_eq!(snapshot.containment, vec![ContainmentEdge::new(12, 10)]);
    assert_eq!(snapshot.edges.len(), 2);
    assert!(snapshot.edges.iter().all(|e| e.rel_type == "CONTAINS"));
}

#[test]
fn test_session_released_after_success() {
    let source = sample();
    fetch_snapshot(&source, "CONTAINS").unwrap();

    assert_eq!(source.sessions_opened(), 1);
    assert_eq!(source.sessions_released(), 1);
}

#[test]
fn test_session_released_after_query_failure() {
    for kind in [QueryKind::Nodes, QueryKind::Containment, QueryKind::Edges] {
        let source = sample().failing_on(kind);
        let err = fetch_snapshot(&source, "CONTAINS").unwrap_err();

        assert!(matches!(err, ExportError::Query { .. }), "{kind:?}: {err:?}");
        assert_eq!(source.sessions_released(), 1, "{kind:?}");
    }
}

#[test]
fn test_session_released_after_integrity_failure() {
    let source = sample().with_edge(11, 99, "CONTAINS", PropertyMap::new());
    let dir = TempDir::new().unwrap();
    let options = ExportOptions {
        output: dir.path().join("out.json"),
        ..ExportOptions::default()
    };

    let err = export_graph(&source, &options).unwrap_err();
    assert!(matches!(err, ExportError::NodeNotFound { node_id: 99, .. }));
    assert_eq!(source.sessions_released(), 1);
    assert!(!options.output.exists());
}

#[test]
fn test_dropped_session_is_released() {
    let source = sample();
    {
        let mut session = source.begin_read().unwrap();
        session.nodes().unwrap();
    }
    assert_eq!(source.sessions_released(), 1);
}

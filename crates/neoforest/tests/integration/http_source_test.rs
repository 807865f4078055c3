//! Integration tests for the HTTP source against a local mock Query API.
//!
//! Tests cover:
//! - The opening statement starts a read transaction and captures its id and affinity
//! - Later statements join the transaction and forward the affinity header
//! - `close` and drop each roll the transaction back exactly once
//! - A failing statement still releases the transaction

use mockito::{Matcher, Mock, Server, ServerGuard};
use neoforest::source::fetch_snapshot;
use neoforest::{
    ConnectionConfig, ContainmentEdge, ExportError, GraphSource, HttpSource, PropertyValue,
};
use serde_json::json;

const TX_PATH: &str = "/db/neo4j/query/v2/tx";
const OPEN_TX_PATH: &str = "/db/neo4j/query/v2/tx/tx-1";
const AFFINITY: &str = "MTAuMC4wLjE6NzY4Nw==";
const TYPED_JSON: &str = "application/vnd.neo4j.query";
// base64("neo4j:secret")
const AUTHORIZATION: &str = "Basic bmVvNGo6c2VjcmV0";

fn source_for(server: &ServerGuard) -> HttpSource {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port.rsplit_once(':').unwrap();
    let config = ConnectionConfig {
        host: host.to_string(),
        port: port.parse().unwrap(),
        password: Some("secret".to_string()),
        ..ConnectionConfig::default()
    };
    HttpSource::new(&config).unwrap()
}

fn int(value: i64) -> serde_json::Value {
    json!({ "$type": "Integer", "_value": value.to_string() })
}

fn mock_open(server: &mut Server) -> Mock {
    server
        .mock("POST", TX_PATH)
        .match_header("authorization", AUTHORIZATION)
        .match_header("accept", TYPED_JSON)
        .match_header("neo4j-cluster-affinity", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({ "accessMode": "Read" })))
        .with_status(202)
        .with_header("content-type", TYPED_JSON)
        .with_header("neo4j-cluster-affinity", AFFINITY)
        .with_body(
            json!({
                "data": {
                    "fields": ["id", "props"],
                    "values": [
                        [int(1), { "$type": "Map", "_value": { "name": { "$type": "String", "_value": "A" } } }],
                        [int(2), { "$type": "Map", "_value": {} }]
                    ]
                },
                "bookmarks": [],
                "transaction": { "id": "tx-1", "expires": "2026-10-18T10:00:00Z" }
            })
            .to_string(),
        )
        .expect(1)
        .create()
}

/// A statement inside the open transaction, told apart by a column name it returns.
fn mock_in_tx(server: &mut Server, column: &str) -> Mock {
    server
        .mock("POST", OPEN_TX_PATH)
        .match_header("authorization", AUTHORIZATION)
        .match_header("neo4j-cluster-affinity", AFFINITY)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(column.to_string()),
            Matcher::PartialJson(json!({ "parameters": { "containmentType": "CONTAINS" } })),
        ]))
}

fn mock_rollback(server: &mut Server, status: usize) -> Mock {
    server
        .mock("DELETE", OPEN_TX_PATH)
        .match_header("authorization", AUTHORIZATION)
        .match_header("neo4j-cluster-affinity", AFFINITY)
        .with_status(status)
        .with_body("{}")
        .expect(1)
        .create()
}

#[test]
fn test_snapshot_runs_in_one_transaction() {
    let mut server = Server::new();
    let open = mock_open(&mut server);
    let containment = mock_in_tx(&mut server, "parentId")
        .with_status(202)
        .with_body(
            json!({
                "data": { "fields": ["parentId", "childId"], "values": [[int(1), int(2)]] },
                "bookmarks": []
            })
            .to_string(),
        )
        .expect(1)
        .create();
    let edges = mock_in_tx(&mut server, "fromId")
        .with_status(202)
        .with_body(
            json!({
                "data": {
                    "fields": ["fromId", "toId", "type", "props"],
                    "values": [[
                        int(2),
                        int(1),
                        { "$type": "String", "_value": "REFERS" },
                        { "$type": "Map", "_value": { "since": { "$type": "Date", "_value": "2021-05-01" } } }
                    ]]
                },
                "bookmarks": []
            })
            .to_string(),
        )
        .expect(1)
        .create();
    let rollback = mock_rollback(&mut server, 200);

    let source = source_for(&server);
    let snapshot = fetch_snapshot(&source, "CONTAINS").unwrap();

    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.nodes[0].properties.get_string("name"), Some("A"));
    assert_eq!(snapshot.containment, vec![ContainmentEdge::new(1, 2)]);
    assert_eq!(snapshot.edges[0].rel_type, "REFERS");
    assert!(matches!(
        snapshot.edges[0].get_property("since"),
        Some(PropertyValue::Temporal(_))
    ));

    open.assert();
    containment.assert();
    edges.assert();
    rollback.assert();
}

#[test]
fn test_failed_statement_still_rolls_back() {
    let mut server = Server::new();
    let open = mock_open(&mut server);
    let containment = mock_in_tx(&mut server, "parentId")
        .with_status(400)
        .with_body(
            json!({
                "errors": [{
                    "code": "Neo.ClientError.Statement.SyntaxError",
                    "message": "Invalid input"
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create();
    let edges = mock_in_tx(&mut server, "fromId").expect(0).create();
    let rollback = mock_rollback(&mut server, 200);

    let source = source_for(&server);
    let err = fetch_snapshot(&source, "CONTAINS").unwrap_err();

    match err {
        ExportError::Query { code, .. } => {
            assert_eq!(code, "Neo.ClientError.Statement.SyntaxError")
        }
        other => panic!("unexpected {other:?}"),
    }
    open.assert();
    containment.assert();
    edges.assert();
    rollback.assert();
}

#[test]
fn test_dropped_session_rolls_back_once() {
    let mut server = Server::new();
    let open = mock_open(&mut server);
    let rollback = mock_rollback(&mut server, 200);

    let source = source_for(&server);
    {
        let mut session = source.begin_read().unwrap();
        assert_eq!(session.nodes().unwrap().len(), 2);
    }

    open.assert();
    rollback.assert();
}

#[test]
fn test_failed_release_is_reported_once() {
    let mut server = Server::new();
    let open = mock_open(&mut server);
    let rollback = mock_rollback(&mut server, 404);

    let source = source_for(&server);
    let mut session = source.begin_read().unwrap();
    session.nodes().unwrap();
    let err = session.close().unwrap_err();

    assert!(matches!(err, ExportError::Connection { .. }));
    open.assert();
    rollback.assert();
}

#[test]
fn test_unused_session_sends_nothing() {
    let mut server = Server::new();
    let posts = server.mock("POST", Matcher::Any).expect(0).create();
    let deletes = server.mock("DELETE", Matcher::Any).expect(0).create();

    let source = source_for(&server);
    let session = source.begin_read().unwrap();
    session.close().unwrap();

    posts.assert();
    deletes.assert();
}

//! Unit tests for forest construction.
//!
//! Tests cover:
//! - Root set equals nodes without an incoming containment edge
//! - Every non-root node is embedded under exactly one parent
//! - Rebuilding from identical input gives an identical forest
//! - Deep containment chains build without exhausting the stack

use neoforest::{
    ContainmentEdge, ExportError, ForestBuilder, NodeId, NodeOrder, NodeRecord, PropertyMap,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn nodes(ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeRecord> {
    ids.into_iter()
        .map(|id| NodeRecord::new(id, PropertyMap::new().with("name", format!("n{id}"))))
        .collect()
}

/// Random forest: node `i` either is a root or hangs under some node `< i`.
fn arb_forest() -> impl Strategy<Value = (usize, Vec<ContainmentEdge>)> {
    (0usize..60).prop_flat_map(|n| {
        let parents: Vec<_> = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    proptest::option::of(0..i as NodeId).boxed()
                }
            })
            .collect();
        (Just(n), parents).prop_map(|(n, parents)| {
            let edges = parents
                .into_iter()
                .enumerate()
                .filter_map(|(child, parent)| {
                    parent.map(|p| ContainmentEdge::new(p, child as NodeId))
                })
                .collect();
            (n, edges)
        })
    })
}

proptest! {
    #[test]
    fn prop_roots_are_nodes_without_parent((n, edges) in arb_forest()) {
        let forest = ForestBuilder::new().build(nodes(0..n as NodeId), &edges).unwrap();

        let children: HashSet<NodeId> = edges.iter().map(|e| e.child).collect();
        let expected: Vec<NodeId> = (0..n as NodeId).filter(|id| !children.contains(id)).collect();
        prop_assert_eq!(forest.root_ids(), expected);
    }

    #[test]
    fn prop_every_node_placed_once_under_its_parent((n, edges) in arb_forest()) {
        let forest = ForestBuilder::new().build(nodes(0..n as NodeId), &edges).unwrap();
        prop_assert_eq!(forest.node_count(), n);
        prop_assert!(forest.unreachable.is_empty());

        let expected_parent: HashMap<NodeId, NodeId> =
            edges.iter().map(|e| (e.child, e.parent)).collect();
        let mut seen = HashSet::new();
        for node in forest.iter() {
            prop_assert!(seen.insert(node.id));
            for child in &node.children {
                prop_assert_eq!(expected_parent.get(&child.id), Some(&node.id));
            }
        }
    }

    #[test]
    fn prop_build_is_idempotent((n, edges) in arb_forest()) {
        let first = ForestBuilder::new().build(nodes(0..n as NodeId), &edges).unwrap();
        let second = ForestBuilder::new().build(nodes(0..n as NodeId), &edges).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_isolated_nodes_are_roots() {
    let forest = ForestBuilder::new().build(nodes([5, 3, 8]), &[]).unwrap();
    assert_eq!(forest.root_ids(), vec![5, 3, 8]);
    assert!(forest.roots.iter().all(|r| r.children.is_empty()));
}

#[test]
fn test_properties_travel_with_node() {
    let edges = [ContainmentEdge::new(1, 2)];
    let forest = ForestBuilder::new().build(nodes([1, 2]), &edges).unwrap();

    let child = &forest.roots[0].children[0];
    assert_eq!(child.properties.get_string("name"), Some("n2"));
}

#[test]
fn test_deep_chain() {
    const DEPTH: NodeId = 10_000;
    let edges: Vec<_> = (1..DEPTH).map(|i| ContainmentEdge::new(i - 1, i)).collect();

    let forest = ForestBuilder::new().build(nodes(0..DEPTH), &edges).unwrap();

    assert_eq!(forest.root_ids(), vec![0]);
    assert_eq!(forest.depth(), DEPTH as usize);
    assert_eq!(forest.node_count(), DEPTH as usize);
}

#[test]
fn test_id_ascending_is_independent_of_input_order() {
    let edges_a = [ContainmentEdge::new(1, 4), ContainmentEdge::new(1, 2)];
    let edges_b = [ContainmentEdge::new(1, 2), ContainmentEdge::new(1, 4)];
    let builder = ForestBuilder::with_order(NodeOrder::IdAscending);

    let a = builder.build(nodes([7, 1, 4, 2]), &edges_a).unwrap();
    let b = builder.build(nodes([2, 4, 1, 7]), &edges_b).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.root_ids(), vec![1, 7]);
}

#[test]
fn test_repeated_pair_is_rejected() {
    let edges = [ContainmentEdge::new(1, 2), ContainmentEdge::new(1, 2)];
    let err = ForestBuilder::new().build(nodes([1, 2]), &edges).unwrap_err();
    assert!(matches!(err, ExportError::MultipleParents { child: 2, .. }));
}

//! Reconstruction of the containment forest from flat parent/child pairs.
//!
//! The containment relation must be a forest: every node has at most one parent. Nodes
//! without a parent become roots, and every other node is embedded exactly once beneath
//! its parent. Trees are assembled with an explicit frame stack so that arbitrarily deep
//! containment chains cannot overflow the call stack.

use crate::error::{ExportError, Result};
use crate::graph::{ContainmentEdge, NodeId, NodeRecord, PropertyMap, TreeNode};
use log::{debug, trace, warn};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Ordering of roots and of each node's children in the built forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeOrder {
    /// Roots in node result order, children in containment result order
    #[default]
    Source,
    /// Roots and children sorted by ascending id
    IdAscending,
}

/// Adjacency map of the containment relation with a reverse parent index.
#[derive(Debug, Clone, Default)]
pub struct ContainmentIndex {
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, NodeId>,
}

impl ContainmentIndex {
    /// Group containment pairs by parent, validating them against the known node ids.
    ///
    /// # Errors
    ///
    /// - [`ExportError::NodeNotFound`] if either end of a pair is not a known node.
    /// - [`ExportError::MultipleParents`] if a node is the child of more than one pair.
    pub fn build(known: &HashSet<NodeId>, edges: &[ContainmentEdge]) -> Result<Self> {
        let mut index = Self::default();

        for edge in edges {
            for id in [edge.parent, edge.child] {
                if !known.contains(&id) {
                    return Err(ExportError::NodeNotFound {
                        node_id: id,
                        referenced_by: edge.to_string(),
                    });
                }
            }

            if let Some(&first_parent) = index.parents.get(&edge.child) {
                return Err(ExportError::MultipleParents {
                    child: edge.child,
                    first_parent,
                    second_parent: edge.parent,
                });
            }

            trace!("Containment {edge}");
            index.parents.insert(edge.child, edge.parent);
            index.children.entry(edge.parent).or_default().push(edge.child);
        }

        Ok(index)
    }

    /// Children of `id` in containment order; empty if it contains nothing.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parent of `id`, if it is contained by another node.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Whether `id` appears as the child of any containment pair.
    pub fn is_child(&self, id: NodeId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Number of containment pairs.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if there are no containment pairs.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Sort every children list by ascending id.
    pub fn sort_children(&mut self) {
        for children in self.children.values_mut() {
            children.sort_unstable();
        }
    }
}

/// The nested result of forest construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    /// Top-level nodes, each carrying its descendants
    pub roots: Vec<TreeNode>,
    /// Nodes that have a parent but are not reachable from any root
    pub unreachable: Vec<NodeId>,
}

impl Forest {
    /// Ids of the roots in output order.
    pub fn root_ids(&self) -> Vec<NodeId> {
        self.roots.iter().map(|r| r.id).collect()
    }

    /// Total number of nodes placed in the forest.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(TreeNode::subtree_len).sum()
    }

    /// Height of the tallest tree; zero for an empty forest.
    pub fn depth(&self) -> usize {
        self.roots.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Pre-order iterator over all trees, root by root.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().flat_map(|root| root.iter())
    }
}

/// Builds a [`Forest`] from node records and containment pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForestBuilder {
    order: NodeOrder,
}

impl ForestBuilder {
    /// Builder keeping source order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder using the given ordering.
    pub fn with_order(order: NodeOrder) -> Self {
        Self { order }
    }

    /// Assemble the forest.
    ///
    /// Roots are the nodes that never appear as a containment child. Each node's children
    /// follow the containment order (or id order with [`NodeOrder::IdAscending`]).
    ///
    /// # Errors
    ///
    /// - [`ExportError::DuplicateNode`] if a node id occurs twice in `nodes`.
    /// - [`ExportError::NodeNotFound`] if a containment pair references an unknown node.
    /// - [`ExportError::MultipleParents`] if the containment relation is not a forest.
    pub fn build(&self, nodes: Vec<NodeRecord>, containment: &[ContainmentEdge]) -> Result<Forest> {
        let mut source_order = Vec::with_capacity(nodes.len());
        let mut properties: HashMap<NodeId, PropertyMap> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if properties.insert(node.id, node.properties).is_some() {
                return Err(ExportError::DuplicateNode { node_id: node.id });
            }
            source_order.push(node.id);
        }

        let known: HashSet<NodeId> = properties.keys().copied().collect();
        let mut index = ContainmentIndex::build(&known, containment)?;

        let mut root_ids: Vec<NodeId> = source_order
            .iter()
            .copied()
            .filter(|id| !index.is_child(*id))
            .collect();
        if self.order == NodeOrder::IdAscending {
            root_ids.sort_unstable();
            index.sort_children();
        }
        debug!(
            "Building forest: {} nodes, {} containment pairs, {} roots",
            source_order.len(),
            index.len(),
            root_ids.len()
        );

        let roots = root_ids
            .into_iter()
            .map(|root| assemble(root, &mut properties, &index))
            .collect::<Result<Vec<_>>>()?;

        // Only nodes on containment cycles can be left over.
        let unreachable: Vec<NodeId> = source_order
            .into_iter()
            .filter(|id| properties.contains_key(id))
            .collect();
        if !unreachable.is_empty() {
            warn!(
                "{} nodes are not reachable from any root and were left out: {:?}",
                unreachable.len(),
                unreachable
            );
        }

        Ok(Forest { roots, unreachable })
    }
}

struct Frame<'a> {
    node: TreeNode,
    pending: std::slice::Iter<'a, NodeId>,
}

impl<'a> Frame<'a> {
    fn open(
        id: NodeId,
        properties: &mut HashMap<NodeId, PropertyMap>,
        index: &'a ContainmentIndex,
    ) -> Result<Self> {
        let props = properties
            .remove(&id)
            .ok_or_else(|| ExportError::NodeNotFound {
                node_id: id,
                referenced_by: index
                    .parent_of(id)
                    .map(|parent| ContainmentEdge::new(parent, id).to_string())
                    .unwrap_or_else(|| "<root>".to_string()),
            })?;
        Ok(Self {
            node: TreeNode::new(id, props),
            pending: index.children_of(id).iter(),
        })
    }
}

/// Depth-first assembly of one tree. Each node's properties are moved out of
/// `properties`, so a node can be placed at most once.
fn assemble(
    root: NodeId,
    properties: &mut HashMap<NodeId, PropertyMap>,
    index: &ContainmentIndex,
) -> Result<TreeNode> {
    let mut stack = vec![Frame::open(root, properties, index)?];
    let mut completed = None;

    while let Some(frame) = stack.last_mut() {
        if let Some(&child) = frame.pending.next() {
            let next = Frame::open(child, properties, index)?;
            stack.push(next);
        } else if let Some(done) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.node.children.push(done.node),
                None => completed = Some(done.node),
            }
        }
    }

    completed.ok_or_else(|| ExportError::NodeNotFound {
        node_id: root,
        referenced_by: "<root>".to_string(),
    })
}

//! Core graph types: records returned by the data source and the nested tree node.

use super::property::{PropertyMap, PropertyValue};

/// Identifier of a node as reported by the data source.
pub type NodeId = i64;

/// A node as returned by the node query: identity plus its full property set.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Store-assigned identifier
    pub id: NodeId,
    /// Flexible key-value metadata
    pub properties: PropertyMap,
}

impl NodeRecord {
    /// Create a new node record.
    pub fn new(id: NodeId, properties: PropertyMap) -> Self {
        Self { id, properties }
    }
}

/// A `parent -> child` pair of the containment relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainmentEdge {
    /// Containing node
    pub parent: NodeId,
    /// Contained node
    pub child: NodeId,
}

impl ContainmentEdge {
    /// Create a new containment pair.
    pub fn new(parent: NodeId, child: NodeId) -> Self {
        Self { parent, child }
    }
}

impl std::fmt::Display for ContainmentEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.parent, self.child)
    }
}

/// Any relationship that is not of the containment type, exported as a flat record.
///
/// Multiple edges between the same pair with the same type are kept as separate records.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Source node ID
    pub from_id: NodeId,
    /// Target node ID
    pub to_id: NodeId,
    /// Relationship type name as stored
    pub rel_type: String,
    /// Relationship metadata
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new edge record.
    pub fn new(
        from_id: NodeId,
        to_id: NodeId,
        rel_type: impl Into<String>,
        properties: PropertyMap,
    ) -> Self {
        Self {
            from_id,
            to_id,
            rel_type: rel_type.into(),
            properties,
        }
    }

    /// Get a property value.
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// A node placed in the containment forest, carrying its nested children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Store-assigned identifier
    pub id: NodeId,
    /// Properties as returned by the data source
    pub properties: PropertyMap,
    /// Directly contained nodes, in containment order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf tree node.
    pub fn new(id: NodeId, properties: PropertyMap) -> Self {
        Self {
            id,
            properties,
            children: Vec::new(),
        }
    }

    /// Get a property value.
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            max = max.max(level);
            stack.extend(node.children.iter().map(|c| (c, level + 1)));
        }
        max
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

// Deep containment chains would otherwise drop recursively.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order traversal over a [`TreeNode`] subtree.
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

//! In-memory graph source.
//!
//! Holds nodes and typed relationships in insertion order and answers the three export
//! queries the same way a live store would. Used by the test suite and by embedders that
//! already have the graph in memory.

use super::{GraphSource, ReadSession};
use crate::error::{ExportError, Result};
use crate::graph::{ContainmentEdge, Edge, NodeId, NodeRecord, PropertyMap};
use log::trace;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Which query a [`MemorySource`] should fail, for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// The node query
    Nodes,
    /// The containment query
    Containment,
    /// The other-edges query
    Edges,
}

/// In-memory graph source.
///
/// Cloning shares the session counters, so a test can keep a handle while the export
/// consumes the source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    nodes: Vec<NodeRecord>,
    relationships: Vec<Edge>,
    fail_on: Option<QueryKind>,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add a node.
    pub fn with_node(mut self, id: NodeId, properties: PropertyMap) -> Self {
        self.add_node(id, properties);
        self
    }

    /// Builder pattern: add a relationship of any type.
    pub fn with_edge(
        mut self,
        from_id: NodeId,
        to_id: NodeId,
        rel_type: &str,
        properties: PropertyMap,
    ) -> Self {
        self.add_edge(from_id, to_id, rel_type, properties);
        self
    }

    /// Builder pattern: make one query fail with a [`ExportError::Query`].
    pub fn failing_on(mut self, kind: QueryKind) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Add a node.
    pub fn add_node(&mut self, id: NodeId, properties: PropertyMap) {
        self.nodes.push(NodeRecord::new(id, properties));
    }

    /// Add a relationship of any type.
    pub fn add_edge(&mut self, from_id: NodeId, to_id: NodeId, rel_type: &str, properties: PropertyMap) {
        self.relationships
            .push(Edge::new(from_id, to_id, rel_type, properties));
    }

    /// Number of sessions handed out so far.
    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions released so far, by `close` or by drop.
    pub fn sessions_released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl GraphSource for MemorySource {
    fn begin_read(&self) -> Result<Box<dyn ReadSession + '_>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            source: self,
            released: false,
        }))
    }
}

struct MemorySession<'a> {
    source: &'a MemorySource,
    released: bool,
}

impl MemorySession<'_> {
    fn check(&self, kind: QueryKind) -> Result<()> {
        if self.source.fail_on == Some(kind) {
            return Err(ExportError::Query {
                statement: format!("{kind:?}"),
                code: "Memory.InjectedFailure".to_string(),
                message: format!("{kind:?} query configured to fail"),
            });
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.released.fetch_add(1, Ordering::SeqCst);
            trace!("Memory session released");
        }
    }
}

impl ReadSession for MemorySession<'_> {
    fn nodes(&mut self) -> Result<Vec<NodeRecord>> {
        self.check(QueryKind::Nodes)?;
        Ok(self.source.nodes.clone())
    }

    fn containment_edges(&mut self, containment_type: &str) -> Result<Vec<ContainmentEdge>> {
        self.check(QueryKind::Containment)?;
        Ok(self
            .source
            .relationships
            .iter()
            .filter(|e| e.rel_type == containment_type)
            .map(|e| ContainmentEdge::new(e.from_id, e.to_id))
            .collect())
    }

    fn other_edges(&mut self, containment_type: &str) -> Result<Vec<Edge>> {
        self.check(QueryKind::Edges)?;
        Ok(self
            .source
            .relationships
            .iter()
            .filter(|e| e.rel_type != containment_type)
            .cloned()
            .collect())
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.release();
        Ok(())
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

//! Data source abstractions and implementations.
//!
//! This module defines the [`GraphSource`] and [`ReadSession`] traits and provides:
//! - [`HttpSource`]: Neo4j over its HTTP Query API (feature `http-source`)
//! - [`MemorySource`]: In-memory source for testing and embedding
//!
//! ## Design Philosophy
//!
//! - **Read Only**: A session never writes to the store
//! - **Scoped Sessions**: Every session is released, explicitly or on drop
//! - **Fail Fast**: The first failing query aborts the export, no retries

#[cfg(feature = "http-source")]
mod http;
mod memory;
pub mod typed_json;

#[cfg(feature = "http-source")]
pub use http::HttpSource;
pub use memory::{MemorySource, QueryKind};

use crate::error::Result;
use crate::graph::{ContainmentEdge, Edge, NodeId, NodeRecord};
use log::{debug, info, log_enabled, trace, Level};
use std::collections::HashMap;

/// A graph store that can hand out read sessions.
pub trait GraphSource {
    /// Acquire a read session.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Connection`](crate::ExportError::Connection) if the store
    /// cannot be reached.
    fn begin_read(&self) -> Result<Box<dyn ReadSession + '_>>;
}

/// A read-only session over a graph store.
///
/// All queries issued through one session observe the same store state.
/// Implementations release their resources in [`ReadSession::close`] and, if the session
/// is dropped without being closed, on drop.
pub trait ReadSession {
    /// Every node's identity and full property set.
    fn nodes(&mut self) -> Result<Vec<NodeRecord>>;

    /// `(parent, child)` for every relationship of type `containment_type`.
    fn containment_edges(&mut self, containment_type: &str) -> Result<Vec<ContainmentEdge>>;

    /// Every relationship whose type is not `containment_type`.
    fn other_edges(&mut self, containment_type: &str) -> Result<Vec<Edge>>;

    /// Release the session, reporting any failure to do so.
    fn close(self: Box<Self>) -> Result<()>;
}

/// The three result sets an export is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    /// All nodes, in source order
    pub nodes: Vec<NodeRecord>,
    /// Containment pairs, in source order
    pub containment: Vec<ContainmentEdge>,
    /// All other relationships, in source order
    pub edges: Vec<Edge>,
}

/// Run the three export queries inside a single read session.
///
/// The session is released before returning, whether the queries succeeded or not.
pub fn fetch_snapshot(source: &dyn GraphSource, containment_type: &str) -> Result<GraphSnapshot> {
    let mut session = source.begin_read()?;
    // On error `session` is dropped here, which releases it.
    let snapshot = run_queries(session.as_mut(), containment_type)?;
    session.close()?;

    info!(
        "Fetched {} nodes, {} containment pairs, {} other edges",
        snapshot.nodes.len(),
        snapshot.containment.len(),
        snapshot.edges.len()
    );
    Ok(snapshot)
}

fn run_queries(session: &mut (dyn ReadSession + '_), containment_type: &str) -> Result<GraphSnapshot> {
    let nodes = session.nodes()?;
    debug!("Node query returned {} records", nodes.len());
    if log_enabled!(Level::Trace) {
        for node in &nodes {
            trace!("Node {}: {:?}", node.id, node.properties);
        }
    }

    let containment = session.containment_edges(containment_type)?;
    debug!(
        "Containment query ({containment_type}) returned {} records",
        containment.len()
    );
    if log_enabled!(Level::Trace) {
        for (parent, children) in group_by_parent(&containment) {
            trace!("Relationships: {parent} -> {children:?}");
        }
    }

    let edges = session.other_edges(containment_type)?;
    debug!("Edge query returned {} records", edges.len());
    if log_enabled!(Level::Trace) {
        for edge in &edges {
            trace!(
                "Edge {} -[{}]-> {}: {:?}",
                edge.from_id,
                edge.rel_type,
                edge.to_id,
                edge.properties
            );
        }
    }

    Ok(GraphSnapshot {
        nodes,
        containment,
        edges,
    })
}

/// Children per parent, parents in order of first appearance.
fn group_by_parent(containment: &[ContainmentEdge]) -> Vec<(NodeId, Vec<NodeId>)> {
    let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
    let mut slots: HashMap<NodeId, usize> = HashMap::new();
    for edge in containment {
        let slot = *slots.entry(edge.parent).or_insert_with(|| {
            groups.push((edge.parent, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(edge.child);
    }
    groups
}

//! Export pipeline and output formats.
//!
//! - [`normalize`]: property values to portable JSON (temporal values to ISO-8601)
//! - [`json`]: the nested document and its 4-space pretty writer
//! - [`outline`]: indented text view of the forest for diagnostics

pub mod json;
pub mod normalize;
pub mod outline;

pub use json::{edge_to_json, write_document, ExportDocument};
pub use normalize::{normalize, normalize_map};
pub use outline::{render_outline, render_outline_with};

use crate::config::ExportOptions;
use crate::error::Result;
use crate::forest::{Forest, ForestBuilder};
use crate::graph::Edge;
use crate::source::{fetch_snapshot, GraphSource};
use log::{debug, info, log_enabled, Level};
use std::path::PathBuf;

/// Counts reported after a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of top-level nodes written
    pub roots: usize,
    /// Number of nodes placed in the forest
    pub nodes: usize,
    /// Number of non-containment edges written
    pub edges: usize,
    /// Nodes left out because no root reaches them
    pub unreachable: usize,
    /// File the document was written to
    pub output: PathBuf,
}

/// Fetch the three result sets and assemble the document without writing it.
pub fn build_document(source: &dyn GraphSource, options: &ExportOptions) -> Result<ExportDocument> {
    let (forest, edges) = fetch_forest(source, options)?;
    Ok(ExportDocument::new(forest, edges))
}

/// Run a complete export: fetch the three result sets, build the forest and write the
/// document to `options.output`.
///
/// # Errors
///
/// Any failure aborts the run. Source and integrity failures happen before the output
/// file is touched; a write failure may leave a truncated file.
pub fn export_graph(source: &dyn GraphSource, options: &ExportOptions) -> Result<ExportSummary> {
    let (forest, edges) = fetch_forest(source, options)?;

    let summary = ExportSummary {
        roots: forest.roots.len(),
        nodes: forest.node_count(),
        edges: edges.len(),
        unreachable: forest.unreachable.len(),
        output: options.output.clone(),
    };

    let document = ExportDocument::new(forest, edges);
    write_document(&document, &options.output)?;

    info!(
        "Wrote {} roots ({} nodes) and {} edges to {}",
        summary.roots,
        summary.nodes,
        summary.edges,
        summary.output.display()
    );
    Ok(summary)
}

fn fetch_forest(source: &dyn GraphSource, options: &ExportOptions) -> Result<(Forest, Vec<Edge>)> {
    let snapshot = fetch_snapshot(source, &options.containment_type)?;
    let forest =
        ForestBuilder::with_order(options.order).build(snapshot.nodes, &snapshot.containment)?;

    if log_enabled!(Level::Debug) {
        debug!("Nested structure:\n{}", render_outline(&forest));
    }

    Ok((forest, snapshot.edges))
}

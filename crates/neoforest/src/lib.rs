//! # neoforest
//!
//! Export a property graph as a nested JSON document: nodes become a forest along a
//! designated containment relationship, every other relationship becomes a flat edge list.
//!
//! ## Core Principles
//!
//! - **Source Agnostic**: The graph store is a collaborator behind [`GraphSource`]
//! - **Explicit Ordering**: Roots and children follow a declared [`NodeOrder`]
//! - **Fail Fast**: Broken references and non-forest containment abort the export
//! - **Portable Values**: Temporal values are written as ISO-8601 text
//!
//! ## Architecture
//!
//! ```text
//! Exporter (document assembly, JSON writer)
//!     ↓
//! Forest Builder (containment index, nested trees)
//!     ↓
//! Data Source (HTTP Query API, memory)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use neoforest::{ExportDocument, ForestBuilder, MemorySource, PropertyMap};
//!
//! let source = MemorySource::new()
//!     .with_node(1, PropertyMap::new().with("name", "A"))
//!     .with_node(2, PropertyMap::new().with("name", "B"))
//!     .with_edge(1, 2, "CONTAINS", PropertyMap::new());
//!
//! let snapshot = neoforest::source::fetch_snapshot(&source, "CONTAINS").unwrap();
//! let forest = ForestBuilder::new().build(snapshot.nodes, &snapshot.containment).unwrap();
//! assert_eq!(forest.root_ids(), vec![1]);
//!
//! let document = ExportDocument::new(forest, snapshot.edges);
//! assert!(document.to_json_string().unwrap().contains("\"children\""));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod export;
pub mod forest;
pub mod graph;
pub mod logging;
pub mod source;

// Re-export main types
pub use config::{ConnectionConfig, ExportConfig, ExportOptions};
pub use error::{ExportError, Result};
pub use export::{export_graph, ExportDocument, ExportSummary};
pub use forest::{ContainmentIndex, Forest, ForestBuilder, NodeOrder};
pub use graph::{
    ContainmentEdge, Edge, NodeId, NodeRecord, PropertyMap, PropertyValue, Temporal, TreeNode,
};
#[cfg(feature = "http-source")]
pub use source::HttpSource;
pub use source::{GraphSource, GraphSnapshot, MemorySource, ReadSession};

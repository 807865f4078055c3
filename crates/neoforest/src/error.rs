//! Error types for neoforest operations.
//!
//! All fallible operations return [`Result<T>`] with context-rich error messages.
//! Every failure is fatal to an export run: nothing is retried.

use crate::graph::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for neoforest operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Comprehensive error type for all export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The data source could not be reached or the transport failed.
    #[error("Connection error: {message}")]
    Connection {
        /// Detailed error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The data source rejected a statement.
    #[error("Query failed ({code}): {message}")]
    Query {
        /// Statement that was being executed
        statement: String,
        /// Status code reported by the server
        code: String,
        /// Server-provided message
        message: String,
    },

    /// A response from the data source did not have the expected shape.
    #[error("Decode error: {message}")]
    Decode {
        /// What could not be decoded
        message: String,
    },

    /// A containment edge references a node that is not in the node set.
    #[error("Node not found: {node_id} (referenced by containment edge {referenced_by})")]
    NodeNotFound {
        /// ID of the missing node
        node_id: NodeId,
        /// The containment edge as `parent->child`
        referenced_by: String,
    },

    /// The node result set listed the same id twice.
    #[error("Duplicate node id: {node_id}")]
    DuplicateNode {
        /// ID that appeared more than once
        node_id: NodeId,
    },

    /// The containment relation is not a forest: a node has more than one parent.
    #[error("Node {child} is contained by both {first_parent} and {second_parent}")]
    MultipleParents {
        /// Node with more than one incoming containment edge
        child: NodeId,
        /// Parent seen first
        first_parent: NodeId,
        /// Conflicting parent
        second_parent: NodeId,
    },

    /// Serialization of the final document failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },
}

impl ExportError {
    /// Create a connection error from a message and optional source.
    pub fn connection<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

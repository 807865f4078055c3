//! Export configuration.
//!
//! Settings come from three layers: built-in defaults, an optional TOML file, and
//! command-line overrides applied by the binary. Every field has a default except the
//! password.
//!
//! ```toml
//! [connection]
//! host = "graph.internal"
//! port = 7474
//! username = "reader"
//! password = "secret"
//!
//! [export]
//! output = "forest.json"
//! containment_type = "CONTAINS"
//! order = "id-ascending"
//! ```

use crate::error::{ExportError, Result};
use crate::forest::NodeOrder;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default output artifact name.
pub const DEFAULT_OUTPUT: &str = "output.json";

/// Default containment relationship type.
pub const DEFAULT_CONTAINMENT_TYPE: &str = "CONTAINS";

/// How to reach the graph store.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// `http` or `https`
    pub scheme: String,
    /// Host name or address
    pub host: String,
    /// HTTP port of the store
    pub port: u16,
    /// User to authenticate as
    pub username: String,
    /// Password; required before connecting
    pub password: Option<String>,
    /// Database to read from
    pub database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 7474,
            username: "neo4j".to_string(),
            password: None,
            database: "neo4j".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Base URL of the Query API for the configured database.
    pub fn query_endpoint(&self) -> String {
        format!(
            "{}://{}:{}/db/{}/query/v2",
            self.scheme, self.host, self.port, self.database
        )
    }

    /// The password, or a configuration error if none was given.
    pub fn require_password(&self) -> Result<&str> {
        self.password
            .as_deref()
            .ok_or_else(|| ExportError::config("no password configured for the graph store"))
    }
}

// Keep the password out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

/// What to export and where to write it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Output file, overwritten if present
    pub output: PathBuf,
    /// Relationship type that defines the containment forest
    pub containment_type: String,
    /// Ordering of roots and children
    pub order: NodeOrder,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            containment_type: DEFAULT_CONTAINMENT_TYPE.to_string(),
            order: NodeOrder::default(),
        }
    }
}

/// Complete configuration for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Graph store connection
    pub connection: ConnectionConfig,
    /// Export behaviour
    pub export: ExportOptions,
}

impl ExportConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ExportError::config(e.to_string()))
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be read and
    /// [`ExportError::Config`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        Self::from_toml_str(&text)
    }
}

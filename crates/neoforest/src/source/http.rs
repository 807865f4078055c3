//! Neo4j source over the HTTP Query API.
//!
//! A session runs its statements in one explicit read transaction: the first statement
//! opens it, later statements join it, and releasing the session rolls it back. Results
//! are requested as typed JSON so temporal values arrive with their native type.

use super::typed_json::{decode_id, decode_properties, decode_string};
use super::{GraphSource, ReadSession};
use crate::config::ConnectionConfig;
use crate::error::{ExportError, Result};
use crate::graph::{ContainmentEdge, Edge, NodeRecord};
use log::{debug, trace, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{json, Value};

const TYPED_JSON: &str = "application/vnd.neo4j.query";
const AFFINITY_HEADER: &str = "neo4j-cluster-affinity";

const NODES_QUERY: &str = "MATCH (n) \
     RETURN id(n) AS id, properties(n) AS props \
     ORDER BY id";

const CONTAINMENT_QUERY: &str = "MATCH (n)-[r]->(m) \
     WHERE type(r) = $containmentType \
     RETURN id(n) AS parentId, id(m) AS childId \
     ORDER BY id(r)";

const EDGES_QUERY: &str = "MATCH (n)-[r]->(m) \
     WHERE type(r) <> $containmentType \
     RETURN id(n) AS fromId, id(m) AS toId, type(r) AS type, properties(r) AS props \
     ORDER BY id(r)";

/// Graph source backed by a Neo4j server's HTTP Query API.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl HttpSource {
    /// Create a source for the given connection settings.
    ///
    /// No request is made until a session runs its first statement.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] if no password is configured and
    /// [`ExportError::Connection`] if the HTTP client cannot be built.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let password = config.require_password()?.to_string();
        let client = Client::builder()
            .build()
            .map_err(|e| ExportError::connection("Failed to build HTTP client", Some(e)))?;

        Ok(Self {
            client,
            endpoint: config.query_endpoint(),
            username: config.username.clone(),
            password,
        })
    }

    /// Base URL of the Query API this source talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorized(&self, request: RequestBuilder, affinity: Option<&str>) -> RequestBuilder {
        let request = request
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, TYPED_JSON);
        match affinity {
            Some(value) => request.header(AFFINITY_HEADER, value),
            None => request,
        }
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl GraphSource for HttpSource {
    fn begin_read(&self) -> Result<Box<dyn ReadSession + '_>> {
        debug!("Opening read session against {}", self.endpoint);
        Ok(Box::new(HttpSession {
            source: self,
            transaction: None,
        }))
    }
}

#[derive(Debug)]
struct Transaction {
    id: String,
    affinity: Option<String>,
}

struct HttpSession<'a> {
    source: &'a HttpSource,
    transaction: Option<Transaction>,
}

impl HttpSession<'_> {
    fn run(&mut self, statement: &str, parameters: Value) -> Result<ResultData> {
        let (url, body) = match &self.transaction {
            Some(tx) => (
                format!("{}/tx/{}", self.source.endpoint, tx.id),
                json!({ "statement": statement, "parameters": parameters }),
            ),
            None => (
                format!("{}/tx", self.source.endpoint),
                json!({ "statement": statement, "parameters": parameters, "accessMode": "Read" }),
            ),
        };
        trace!("POST {url}: {statement}");

        let affinity = self.transaction.as_ref().and_then(|tx| tx.affinity.as_deref());
        let response = self
            .source
            .authorized(self.source.client.post(&url), affinity)
            .json(&body)
            .send()
            .map_err(|e| ExportError::connection(format!("Request to {url} failed"), Some(e)))?;

        let status = response.status();
        let affinity = response
            .headers()
            .get(AFFINITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .map_err(|e| ExportError::connection("Failed to read response body", Some(e)))?;
        debug!("Query API response status: {status}");

        let parsed = parse_response(statement, status.is_success(), status.as_u16(), &text)?;

        if self.transaction.is_none() {
            let info = parsed.transaction.ok_or_else(|| {
                ExportError::decode("response to an opening statement carried no transaction")
            })?;
            debug!("Opened read transaction {}", info.id);
            self.transaction = Some(Transaction {
                id: info.id,
                affinity,
            });
        }

        Ok(parsed.data.unwrap_or_default())
    }

    fn rollback(&mut self) -> Result<()> {
        let Some(tx) = self.transaction.take() else {
            return Ok(());
        };
        let url = format!("{}/tx/{}", self.source.endpoint, tx.id);
        trace!("DELETE {url}");

        let response = self
            .source
            .authorized(self.source.client.delete(&url), tx.affinity.as_deref())
            .send()
            .map_err(|e| ExportError::connection(format!("Request to {url} failed"), Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::connection(
                format!("Releasing transaction {} failed with HTTP {status}", tx.id),
                None::<std::io::Error>,
            ));
        }
        debug!("Released read transaction {}", tx.id);
        Ok(())
    }
}

impl ReadSession for HttpSession<'_> {
    fn nodes(&mut self) -> Result<Vec<NodeRecord>> {
        let data = self.run(NODES_QUERY, json!({}))?;
        let id = data.column("id")?;
        let props = data.column("props")?;

        data.values
            .iter()
            .map(|row| {
                Ok(NodeRecord::new(
                    decode_id(cell(row, id)?)?,
                    decode_properties(cell(row, props)?)?,
                ))
            })
            .collect()
    }

    fn containment_edges(&mut self, containment_type: &str) -> Result<Vec<ContainmentEdge>> {
        let data = self.run(
            CONTAINMENT_QUERY,
            json!({ "containmentType": containment_type }),
        )?;
        let parent = data.column("parentId")?;
        let child = data.column("childId")?;

        data.values
            .iter()
            .map(|row| {
                Ok(ContainmentEdge::new(
                    decode_id(cell(row, parent)?)?,
                    decode_id(cell(row, child)?)?,
                ))
            })
            .collect()
    }

    fn other_edges(&mut self, containment_type: &str) -> Result<Vec<Edge>> {
        let data = self.run(EDGES_QUERY, json!({ "containmentType": containment_type }))?;
        let from = data.column("fromId")?;
        let to = data.column("toId")?;
        let rel_type = data.column("type")?;
        let props = data.column("props")?;

        data.values
            .iter()
            .map(|row| {
                Ok(Edge::new(
                    decode_id(cell(row, from)?)?,
                    decode_id(cell(row, to)?)?,
                    decode_string(cell(row, rel_type)?)?,
                    decode_properties(cell(row, props)?)?,
                ))
            })
            .collect()
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.rollback()
    }
}

impl Drop for HttpSession<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.rollback() {
            warn!("Failed to release read transaction: {e}");
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<ResultData>,
    #[serde(default)]
    errors: Vec<ServerError>,
    #[serde(default)]
    transaction: Option<TransactionInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultData {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ResultData {
    fn column(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| ExportError::decode(format!("result has no column '{name}'")))
    }
}

#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TransactionInfo {
    id: String,
}

fn cell(row: &[Value], index: usize) -> Result<&Value> {
    row.get(index)
        .ok_or_else(|| ExportError::decode(format!("row has no value at column {index}")))
}

fn parse_response(statement: &str, success: bool, status: u16, body: &str) -> Result<QueryResponse> {
    let parsed: Option<QueryResponse> = serde_json::from_str(body).ok();

    if let Some(error) = parsed.as_ref().and_then(|r| r.errors.first()) {
        return Err(ExportError::Query {
            statement: statement.to_string(),
            code: error.code.clone(),
            message: error.message.clone(),
        });
    }
    if !success {
        return Err(ExportError::connection(
            format!("HTTP {status}: {body}"),
            None::<std::io::Error>,
        ));
    }
    parsed.ok_or_else(|| ExportError::decode(format!("malformed Query API response: {body}")))
}

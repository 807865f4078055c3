//! JSON document for the nested export.
//!
//! Generates `{"nodes": [...], "edges": [...]}` where `nodes` holds the roots of the
//! containment forest with their descendants nested under `children`, and `edges` holds
//! every other relationship as a flat record.
//!
//! The node forest is streamed from an explicit frame stack rather than built as one
//! nested [`Value`], so the depth of a containment chain is bounded by heap, not by the
//! call stack.

use super::normalize::normalize;
use crate::error::{ExportError, Result};
use crate::forest::Forest;
use crate::graph::{Edge, NodeId, PropertyMap, PropertyValue, TreeNode};
use log::warn;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const INDENT: &[u8] = b"    ";

/// Keys the exporter adds to every node object.
pub const NODE_KEYS: [&str; 2] = ["id", "children"];

/// Keys the exporter adds to every edge object.
pub const EDGE_KEYS: [&str; 5] = ["fromId", "toId", "type", "displayFromId", "displayToId"];

/// The final export artifact: forest roots plus the flat edge list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportDocument {
    /// Root nodes, each carrying its nested descendants
    pub nodes: Vec<TreeNode>,
    /// Non-containment relationships
    pub edges: Vec<Edge>,
}

impl ExportDocument {
    /// Assemble the document from a built forest and the other edges.
    pub fn new(forest: Forest, edges: Vec<Edge>) -> Self {
        Self {
            nodes: forest.roots,
            edges,
        }
    }

    /// Parse the serialized document back into a JSON value.
    ///
    /// Meant for inspecting small documents. `serde_json` refuses input nested deeper than
    /// its recursion limit, so a deep forest yields an error here while
    /// [`to_json_string`](Self::to_json_string) and [`write_document`] still succeed.
    pub fn to_json(&self) -> Result<Value> {
        let text = self.to_json_string()?;
        serde_json::from_str(&text)
            .map_err(|e| ExportError::serialization("Document too deep to load as a value", Some(e)))
    }

    /// Serialize the document with 4-space indentation.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        DocumentWriter::new(&mut buf)
            .document(self)
            .map_err(|e| ExportError::serialization("Failed to serialize JSON document", Some(e)))?;
        String::from_utf8(buf)
            .map_err(|e| ExportError::serialization("Serialized document is not UTF-8", Some(e)))
    }
}

/// Write the document to `path`, replacing any existing content.
///
/// The write is not atomic: a failure part-way leaves a truncated file.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be created or written.
pub fn write_document(document: &ExportDocument, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    DocumentWriter::new(&mut writer)
        .document(document)
        .map_err(|e| ExportError::io(path, e))?;
    writer.flush().map_err(|e| ExportError::io(path, e))
}

/// Convert an edge to a flat JSON object.
///
/// Key order: `fromId`, `toId`, `type`, the edge's properties, then the display copies.
pub fn edge_to_json(edge: &Edge) -> Value {
    let mut obj = Map::new();
    obj.insert("fromId".to_string(), json!(edge.from_id));
    obj.insert("toId".to_string(), json!(edge.to_id));
    obj.insert("type".to_string(), json!(edge.rel_type));
    for (key, value) in exported_properties(&edge.properties, &EDGE_KEYS, "edge from", edge.from_id) {
        obj.insert(key.clone(), normalize(value));
    }
    obj.insert("displayFromId".to_string(), json!(edge.from_id));
    obj.insert("displayToId".to_string(), json!(edge.to_id));
    Value::Object(obj)
}

/// Properties that do not collide with an exported key.
fn exported_properties<'a>(
    props: &'a PropertyMap,
    reserved: &'a [&'static str],
    entity: &'a str,
    id: NodeId,
) -> impl Iterator<Item = (&'a String, &'a PropertyValue)> + 'a {
    props.iter().filter(move |(key, _)| {
        let collides = reserved.contains(&key.as_str());
        if collides {
            warn!("Property '{key}' on {entity} {id} collides with an exported key and was dropped");
        }
        !collides
    })
}

/// Children list still being written.
struct Level<'a> {
    pending: std::slice::Iter<'a, TreeNode>,
    first: bool,
}

/// Pretty printer matching `serde_json`'s 4-space output, driven by hand so the
/// forest can be walked without recursion.
struct DocumentWriter<W> {
    out: W,
    depth: usize,
}

impl<W: Write> DocumentWriter<W> {
    fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }

    fn document(&mut self, document: &ExportDocument) -> io::Result<()> {
        self.open(b"{")?;
        self.key("nodes", true)?;
        self.nodes(&document.nodes)?;
        self.key("edges", false)?;
        self.edges(&document.edges)?;
        self.close(b"}")
    }

    fn nodes(&mut self, roots: &[TreeNode]) -> io::Result<()> {
        if roots.is_empty() {
            return self.out.write_all(b"[]");
        }
        self.open(b"[")?;
        let mut stack = vec![Level {
            pending: roots.iter(),
            first: true,
        }];

        while let Some(level) = stack.last_mut() {
            match level.pending.next() {
                Some(node) => {
                    if !level.first {
                        self.out.write_all(b",")?;
                    }
                    level.first = false;
                    self.newline()?;
                    self.node_head(node)?;

                    if node.children.is_empty() {
                        self.out.write_all(b"[]")?;
                        self.close(b"}")?;
                    } else {
                        self.open(b"[")?;
                        stack.push(Level {
                            pending: node.children.iter(),
                            first: true,
                        });
                    }
                }
                None => {
                    stack.pop();
                    self.close(b"]")?;
                    // A finished children list also finishes the node that owns it.
                    if !stack.is_empty() {
                        self.close(b"}")?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Everything of a node object up to the value of `children`.
    fn node_head(&mut self, node: &TreeNode) -> io::Result<()> {
        self.open(b"{")?;
        self.key("id", true)?;
        self.value(&json!(node.id))?;
        for (key, value) in exported_properties(&node.properties, &NODE_KEYS, "node", node.id) {
            self.key(key, false)?;
            self.value(&normalize(value))?;
        }
        self.key("children", false)
    }

    fn edges(&mut self, edges: &[Edge]) -> io::Result<()> {
        if edges.is_empty() {
            return self.out.write_all(b"[]");
        }
        self.open(b"[")?;
        for (i, edge) in edges.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
            }
            self.newline()?;
            self.value(&edge_to_json(edge))?;
        }
        self.close(b"]")
    }

    fn key(&mut self, key: &str, first: bool) -> io::Result<()> {
        if !first {
            self.out.write_all(b",")?;
        }
        self.newline()?;
        serde_json::to_writer(&mut self.out, key)?;
        self.out.write_all(b": ")
    }

    /// Write a shallow value at the current depth.
    fn value(&mut self, value: &Value) -> io::Result<()> {
        let mut buf = Vec::new();
        {
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
            value.serialize(&mut serializer)?;
        }
        // Strings never hold a raw newline, so every newline is layout.
        for (i, line) in buf.split(|&b| b == b'\n').enumerate() {
            if i > 0 {
                self.newline()?;
            }
            self.out.write_all(line)?;
        }
        Ok(())
    }

    fn open(&mut self, bracket: &[u8]) -> io::Result<()> {
        self.depth += 1;
        self.out.write_all(bracket)
    }

    fn close(&mut self, bracket: &[u8]) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.newline()?;
        self.out.write_all(bracket)
    }

    fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        for _ in 0..self.depth {
            self.out.write_all(INDENT)?;
        }
        Ok(())
    }
}

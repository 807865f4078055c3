//! Plain-text outline of a forest, for diagnostics.
//!
//! One line per node, indented two spaces per level:
//!
//! ```text
//! - id: 1, name: "A", children count: 1
//!   - id: 2, name: "B", children count: 0
//! - id: 3, name: "C", children count: 0
//! ```

use super::normalize::normalize;
use crate::forest::Forest;
use std::fmt::Write;

/// Render the forest as an indented outline, labelling nodes by their `name` property.
pub fn render_outline(forest: &Forest) -> String {
    render_outline_with(forest, "name")
}

/// Render the forest as an indented outline, labelling nodes by `label_key`.
pub fn render_outline_with(forest: &Forest, label_key: &str) -> String {
    let mut out = String::new();
    let mut stack: Vec<_> = forest.roots.iter().rev().map(|root| (root, 0usize)).collect();

    while let Some((node, level)) = stack.pop() {
        let label = node
            .get_property(label_key)
            .map(|v| normalize(v).to_string())
            .unwrap_or_else(|| "null".to_string());
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{:indent$}- id: {}, {}: {}, children count: {}",
            "",
            node.id,
            label_key,
            label,
            node.children.len(),
            indent = level * 2
        );
        stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
    }

    out
}

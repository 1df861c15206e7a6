//! The identifier-tagged document tree.
//!
//! - [`node`]: the [`Node`] sum type and its JSON wire form
//! - [`builder`]: markup → tree conversion with post-order id assignment
//!
//! Trees travel between the pipeline stages as JSON. [`to_json`] and
//! [`from_json`] are the only places that encode or decode that form.

mod builder;
mod node;

pub use builder::{MAX_DEPTH, NON_EDITABLE_TAGS, build_tree, raw_html_node};
pub use node::{
    Attributes, Content, Descendants, Element, Node, NodeId, RAW_HTML_TAG, ROOT_TAG, TEXT_TYPE,
    Text,
};

use crate::error::{Error, Result};

/// Encode a tree as pretty-printed JSON.
///
/// Non-ASCII text and markup characters are written as-is.
pub fn to_json(tree: &Node) -> Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Decode a tree, naming `operation` in the error if the input is not a tree.
pub fn from_json(json: &str, operation: &'static str) -> Result<Node> {
    serde_json::from_str(json).map_err(|e| Error::invalid_tree(operation, e))
}

/// Node counts of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub elements: usize,
    pub texts: usize,
    pub editable: usize,
    /// Deepest nesting level, the top node being depth 1.
    pub depth: usize,
}

impl TreeStats {
    pub fn collect(tree: &Node) -> Self {
        let mut stats = TreeStats::default();
        let mut stack = vec![(tree, 1)];
        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);
            match node {
                Node::Element(_) => stats.elements += 1,
                Node::Text(_) => stats.texts += 1,
            }
            if node.is_editable() {
                stats.editable += 1;
            }
            stack.extend(node.children().iter().map(|c| (c, depth + 1)));
        }
        stats
    }
}

//! Tree → chunk extraction.

use std::fmt;

use crate::tree::{Content, Node, NodeId};

use super::MARKER;

/// Default upper bound on the characters collected before a chunk is cut.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 4000;

/// Index of the first chunk of every extraction.
pub const FIRST_CHUNK_INDEX: u32 = 100;

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// A chunk is cut as soon as its text reaches this many characters.
    pub max_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

impl ChunkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size limit. Zero is treated as one.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }
}

/// One size-bounded piece of extracted text.
///
/// Its [`Display`](fmt::Display) form is the wire form, `##NNN##<text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u32,
    pub text: String,
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MARKER}{:03}{MARKER}{}", self.index, self.text)
    }
}

/// Collect the editable text of a tree into chunks.
///
/// The walk is depth-first. Every text node contributes its id marker and its
/// text; an editable element contributes its id marker before its children.
/// Non-editable elements contribute nothing themselves but are still walked.
///
/// # Examples
///
/// ```
/// use htmlchunk::chunk::{ChunkConfig, extract_chunks};
/// use htmlchunk::tree::build_tree;
///
/// let tree = build_tree("<p>Hello <b>world</b></p>");
/// let chunks = extract_chunks(&tree, &ChunkConfig::default());
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].to_string(), "##100####00001##Hello ##00003####00002##world");
/// ```
pub fn extract_chunks(tree: &Node, config: &ChunkConfig) -> Vec<Chunk> {
    let mut extractor = Extractor::new(config);
    extractor.visit(tree);
    let chunks = extractor.finish();
    tracing::debug!(
        "extracted {} chunks (limit {} chars)",
        chunks.len(),
        config.max_chars
    );
    chunks
}

/// Buffer and chunk counter of one extraction.
struct Extractor {
    max_chars: usize,
    buffer: String,
    buffer_chars: usize,
    next_index: u32,
    chunks: Vec<Chunk>,
}

impl Extractor {
    fn new(config: &ChunkConfig) -> Self {
        Self {
            max_chars: config.max_chars.max(1),
            buffer: String::new(),
            buffer_chars: 0,
            next_index: FIRST_CHUNK_INDEX,
            chunks: Vec::new(),
        }
    }

    fn visit(&mut self, node: &Node) {
        match node {
            Node::Text(text) => {
                self.push_marker(text.id);
                self.push_text(&text.text);
            }
            Node::Element(element) => {
                if element.is_editable {
                    self.push_marker(element.id);
                }
                match &element.content {
                    Content::Children(children) => {
                        for child in children {
                            self.visit(child);
                        }
                    }
                    Content::Text(text) if element.is_editable => self.push_text(text),
                    Content::Text(_) => {}
                }
            }
        }
    }

    fn push_marker(&mut self, id: NodeId) {
        self.push_text(&format!("{MARKER}{id}{MARKER}"));
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.push_str(text);
        self.buffer_chars += text.chars().count();
        if self.buffer_chars >= self.max_chars {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.chunks.push(Chunk {
            index: self.next_index,
            text: std::mem::take(&mut self.buffer),
        });
        self.buffer_chars = 0;
        self.next_index += 1;
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }
}

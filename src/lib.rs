//! # htmlchunk
//!
//! Round-trip HTML through external editing tools (translation, review) one
//! text run at a time.
//!
//! ## Pipeline
//!
//! 1. [`html_to_json`] parses markup into a tree of elements and text nodes,
//!    each tagged with a five-digit id and an editability flag.
//! 2. [`extract_chunks`] collects the editable text of the tree into
//!    size-bounded chunks in which every text run is announced by its id.
//! 3. The chunks are edited elsewhere, keeping the `##…##` markers intact.
//! 4. [`parse_edited_chunks`] turns the edited text back into an [`EditMap`].
//! 5. [`apply_edits`] merges the map into the tree, and [`json_to_html`]
//!    renders the result.
//!
//! ## Quick Start
//!
//! ```
//! use htmlchunk::{apply_edits, extract_chunks, html_to_json, json_to_html, parse_edited_chunks};
//!
//! let tree = html_to_json("<p>Hello <b>world</b></p>").unwrap();
//!
//! let chunks = extract_chunks(&tree).unwrap();
//! assert_eq!(chunks, vec!["##100####00001##Hello ##00003####00002##world"]);
//!
//! // An editor translates the text, leaving the markers alone
//! let edited = chunks.concat().replace("world", "earth");
//!
//! let edits = parse_edited_chunks(&edited);
//! let updated = apply_edits(&tree, &edits).unwrap();
//! assert_eq!(json_to_html(&updated).unwrap(), "<p>Hello <b>earth</b></p>");
//! ```
//!
//! ## Working with Trees
//!
//! The string functions above exchange trees as JSON. The same steps are
//! available on typed values: [`tree::build_tree`], [`render::render`],
//! [`chunk::extract_chunks`], [`EditMap::parse`] and [`update::update_tree`].

pub mod chunk;
pub mod error;
pub mod normalize;
pub mod render;
pub mod tree;
pub mod update;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use chunk::{Chunk, ChunkConfig, EditMap};
pub use error::{Error, Result};
pub use tree::{Node, NodeId};

/// Convert HTML into tree JSON.
///
/// Markup that cannot be parsed is kept as a single non-editable `rawHtml`
/// node; only encoding the JSON can fail.
pub fn html_to_json(html: &str) -> Result<String> {
    tree::to_json(&tree::build_tree(html))
}

/// Render tree JSON back into HTML.
pub fn json_to_html(json: &str) -> Result<String> {
    let tree = tree::from_json(json, "json_to_html")?;
    Ok(render::render(&tree))
}

/// Extract the editable text of tree JSON as chunks of at most
/// [`chunk::DEFAULT_MAX_CHUNK_CHARS`] characters (a chunk is cut once it
/// reaches the limit).
pub fn extract_chunks(json: &str) -> Result<Vec<String>> {
    extract_chunks_with(json, &ChunkConfig::default())
}

/// [`extract_chunks`] with explicit settings.
pub fn extract_chunks_with(json: &str, config: &ChunkConfig) -> Result<Vec<String>> {
    let tree = tree::from_json(json, "extract_chunks")?;
    Ok(chunk::extract_chunks(&tree, config)
        .iter()
        .map(Chunk::to_string)
        .collect())
}

/// Parse edited chunk text (all chunks concatenated in order) into an edit map.
pub fn parse_edited_chunks(text: &str) -> EditMap {
    EditMap::parse(text)
}

/// Merge an edit map into tree JSON, returning the updated tree JSON.
pub fn apply_edits(json: &str, edits: &EditMap) -> Result<String> {
    let tree = tree::from_json(json, "apply_edits")?;
    tree::to_json(&update::update_tree(&tree, edits))
}

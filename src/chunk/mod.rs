//! Chunked text exchange with external editors.
//!
//! - [`extract`]: tree → ordered, size-bounded chunks of marker-tagged text
//! - [`parse`]: edited chunk text → [`EditMap`]
//!
//! ## Wire format
//!
//! Each chunk is `##NNN##<text>` where `NNN` is the chunk index, zero-padded
//! to three digits and starting at 100. Inside `<text>`, every editable node
//! is announced by `##IIIII##` (its five-digit id), followed by its text:
//!
//! ```text
//! ##100####00001##Hello ##00003####00002##world
//! ```
//!
//! Chunks are cut purely on size, so a node's text can continue in the next
//! chunk. The parser treats chunk markers as transparent, which re-joins such
//! text as long as the chunks are handed back concatenated in order.

mod extract;
mod parse;

pub use extract::{Chunk, ChunkConfig, DEFAULT_MAX_CHUNK_CHARS, FIRST_CHUNK_INDEX, extract_chunks};
pub use parse::EditMap;

/// Marker delimiter.
pub const MARKER: &str = "##";

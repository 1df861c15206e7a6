//! Edited chunk text → edit map.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

use super::MARKER;

/// Replacement text per node id.
///
/// Built once from edited chunk text and applied once by
/// [`update_tree`](crate::update::update_tree). Serializes as a JSON object
/// keyed by five-digit ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditMap {
    edits: BTreeMap<NodeId, String>,
}

/// Marker found at some position of the edited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    /// `##IIIII##`: the text that follows belongs to this node.
    Node(NodeId),
    /// `##NNN##`: chunk boundary, carries no text of its own.
    Chunk(u32),
}

impl EditMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the concatenation of previously extracted, possibly edited chunks.
    ///
    /// Each `##IIIII##` marker starts the text of node `IIIII`, which runs to
    /// the next node marker or the end of the input. Chunk markers between
    /// them are dropped, so text cut across two chunks comes back whole.
    /// Anything before the first node marker is ignored, and a later
    /// occurrence of an id replaces an earlier one.
    ///
    /// The first chunk marker fixes the sequence; after it only the next
    /// index counts as a boundary. Any other `##NNN##` is text, such as a
    /// node whose text ends in `##123` followed by the next node marker.
    ///
    /// Editors sometimes turn `##` into `# #`; that is repaired first.
    ///
    /// # Examples
    ///
    /// ```
    /// use htmlchunk::chunk::EditMap;
    /// use htmlchunk::tree::NodeId;
    ///
    /// let edits = EditMap::parse("##100####00001##Hello ##00003####00002##earth");
    /// assert_eq!(edits.get(NodeId(2)), Some("earth"));
    /// assert_eq!(edits.get(NodeId(3)), Some(""));
    /// ```
    pub fn parse(edited: &str) -> Self {
        let text = edited.replace("# #", MARKER);
        let bytes = text.as_bytes();

        let mut edits = EditMap::new();
        let mut current: Option<(NodeId, String)> = None;
        let mut next_chunk: Option<u32> = None;
        let mut segment_start = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            let Some((marker, end)) = marker_at(bytes, pos) else {
                pos += 1;
                continue;
            };
            if let Marker::Chunk(index) = marker {
                if next_chunk.is_some_and(|expected| expected != index) {
                    pos += 1;
                    continue;
                }
                next_chunk = index.checked_add(1);
            }

            if let Some((_, content)) = current.as_mut() {
                content.push_str(&text[segment_start..pos]);
            }
            if let Marker::Node(id) = marker {
                if let Some((prev, content)) = current.take() {
                    edits.insert(prev, content);
                }
                current = Some((id, String::new()));
            }

            pos = end;
            segment_start = end;
        }

        if let Some((id, mut content)) = current {
            content.push_str(&text[segment_start..]);
            edits.insert(id, content);
        }

        tracing::debug!("parsed {} edited segments", edits.len());
        edits
    }

    /// Record a replacement, overwriting any earlier one for the same id.
    pub fn insert(&mut self, id: NodeId, text: impl Into<String>) {
        self.edits.insert(id, text.into());
    }

    /// The recorded text for `id`, empty or not.
    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.edits.get(&id).map(String::as_str)
    }

    /// The text that should replace the content of `id`.
    ///
    /// Empty entries mean "unchanged" and yield `None`.
    pub fn replacement(&self, id: NodeId) -> Option<&str> {
        self.get(id).filter(|text| !text.is_empty())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.edits.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.edits.iter().map(|(id, text)| (*id, text.as_str()))
    }
}

impl FromIterator<(NodeId, String)> for EditMap {
    fn from_iter<I: IntoIterator<Item = (NodeId, String)>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EditMap {
    type Item = (NodeId, String);
    type IntoIter = btree_map::IntoIter<NodeId, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}

/// Recognize a marker starting at `pos`, returning it and the position after it.
///
/// A marker is `##`, a run of ASCII digits, then `##`. Five digits name a
/// node; three, four or more than five digits are a chunk index. Shorter
/// runs, and runs too long for a `u32`, are ordinary text.
fn marker_at(bytes: &[u8], pos: usize) -> Option<(Marker, usize)> {
    let rest = &bytes[pos..];
    if !rest.starts_with(MARKER.as_bytes()) {
        return None;
    }

    let digits = rest[2..].iter().take_while(|b| b.is_ascii_digit()).count();
    let close = 2 + digits;
    if !rest[close..].starts_with(MARKER.as_bytes()) {
        return None;
    }

    let end = pos + close + 2;
    match digits {
        0..=2 => None,
        NodeId::WIDTH => {
            let id = std::str::from_utf8(&rest[2..close]).ok().and_then(NodeId::parse)?;
            Some((Marker::Node(id), end))
        }
        _ => {
            let index = std::str::from_utf8(&rest[2..close]).ok()?.parse().ok()?;
            Some((Marker::Chunk(index), end))
        }
    }
}

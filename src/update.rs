//! Merge an [`EditMap`] into a tree.
//!
//! The updated tree is built fresh from the borrowed input, so the caller's
//! tree is never touched.

use crate::chunk::EditMap;
use crate::tree::{Content, Element, Node, Text};

/// Build a copy of `tree` with every edit applied.
///
/// - The top node is never edited, even if its id is in the map.
/// - A text node with a non-empty replacement gets the new text.
/// - An element with a non-empty replacement loses its children; its content
///   becomes the replacement text.
/// - Empty replacements and unknown ids change nothing.
///
/// # Examples
///
/// ```
/// use htmlchunk::chunk::EditMap;
/// use htmlchunk::render::render;
/// use htmlchunk::tree::{NodeId, build_tree};
/// use htmlchunk::update::update_tree;
///
/// let tree = build_tree("<p>Hello <b>world</b></p>");
/// let mut edits = EditMap::new();
/// edits.insert(NodeId(2), "earth");
///
/// let updated = update_tree(&tree, &edits);
/// assert_eq!(render(&updated), "<p>Hello <b>earth</b></p>");
/// ```
pub fn update_tree(tree: &Node, edits: &EditMap) -> Node {
    let mut merge = Merge { edits, applied: 0 };

    let updated = match tree {
        Node::Element(top) => Node::Element(Element {
            content: merge.content(&top.content),
            ..shallow(top)
        }),
        Node::Text(text) => Node::Text(text.clone()),
    };

    if tracing::enabled!(tracing::Level::DEBUG) {
        for (id, _) in edits.iter().filter(|(id, _)| tree.find(*id).is_none()) {
            tracing::debug!("no node {id} in tree, edit ignored");
        }
    }
    tracing::debug!(
        "applied {} of {} edits",
        merge.applied,
        edits.len()
    );
    updated
}

/// Walk state: the edits and how many of them took effect.
struct Merge<'a> {
    edits: &'a EditMap,
    applied: usize,
}

impl Merge<'_> {
    fn node(&mut self, node: &Node) -> Node {
        match node {
            Node::Text(text) => {
                let new_text = match self.edits.replacement(text.id) {
                    Some(replacement) => {
                        tracing::debug!("replaced text of node {}", text.id);
                        self.applied += 1;
                        replacement.to_string()
                    }
                    None => text.text.clone(),
                };
                Node::Text(Text {
                    id: text.id,
                    text: new_text,
                })
            }
            Node::Element(element) => {
                let content = match self.edits.replacement(element.id) {
                    Some(replacement) => {
                        tracing::debug!("replaced content of <{}> node {}", element.tag, element.id);
                        self.applied += 1;
                        Content::Text(replacement.to_string())
                    }
                    None => self.content(&element.content),
                };
                Node::Element(Element {
                    content,
                    ..shallow(element)
                })
            }
        }
    }

    fn content(&mut self, content: &Content) -> Content {
        match content {
            Content::Children(children) => {
                Content::Children(children.iter().map(|child| self.node(child)).collect())
            }
            Content::Text(text) => Content::Text(text.clone()),
        }
    }
}

/// Copy of an element's own fields, with empty content.
fn shallow(element: &Element) -> Element {
    Element {
        id: element.id,
        tag: element.tag.clone(),
        attributes: element.attributes.clone(),
        is_editable: element.is_editable,
        content: Content::Children(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use crate::tree::{NodeId, build_tree};

    fn edits(pairs: &[(u32, &str)]) -> EditMap {
        pairs
            .iter()
            .map(|(id, text)| (NodeId(*id), text.to_string()))
            .collect()
    }

    #[test]
    fn test_text_edit() {
        let tree = build_tree("<p>Hello <b>world</b></p>");
        let updated = update_tree(&tree, &edits(&[(2, "earth")]));
        assert_eq!(render(&updated), "<p>Hello <b>earth</b></p>");
    }

    #[test]
    fn test_original_tree_is_untouched() {
        let tree = build_tree("<p>Hello <b>world</b></p>");
        let before = tree.clone();
        let _ = update_tree(&tree, &edits(&[(1, "Bye "), (2, "moon")]));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_element_edit_replaces_children() {
        let tree = build_tree("<p>Hello <b>world</b></p>");
        let updated = update_tree(&tree, &edits(&[(3, "<i>bold</i> move")]));

        let b = updated.find(NodeId(3)).and_then(Node::as_element).unwrap();
        assert_eq!(b.content, Content::Text("<i>bold</i> move".to_string()));
        assert!(updated.find(NodeId(2)).is_none());
        assert_eq!(render(&updated), "<p>Hello <b><i>bold</i> move</b></p>");
    }

    #[test]
    fn test_top_node_is_never_edited() {
        let tree = build_tree("<p>x</p>");
        let top = tree.id();
        let updated = update_tree(&tree, &edits(&[(top.0, "gone")]));
        assert_eq!(updated, tree);
    }

    #[test]
    fn test_empty_replacement_is_no_change() {
        let tree = build_tree("<p>Hello <b>world</b></p>");
        let updated = update_tree(&tree, &edits(&[(1, ""), (3, ""), (2, "")]));
        assert_eq!(updated, tree);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let tree = build_tree("<p>x</p>");
        let updated = update_tree(&tree, &edits(&[(99_999, "nope")]));
        assert_eq!(updated, tree);
    }

    #[test]
    fn test_only_edited_node_changes() {
        let tree = build_tree("<ul><li>one</li><li>two</li><li>three</li></ul>");
        let updated = update_tree(&tree, &edits(&[(3, "deux")]));

        let changed: Vec<_> = tree
            .descendants()
            .zip(updated.descendants())
            .filter(|(a, b)| a != b)
            .map(|(a, _)| a.id().0)
            .collect();
        // Only the edited text node and the ancestors containing it differ
        assert_eq!(changed, vec![8, 7, 4, 3]);
        assert_eq!(render(&updated), "<ul><li>one</li><li>deux</li><li>three</li></ul>");
    }

    #[test]
    fn test_edit_inside_raw_html_is_ignored() {
        let tree = build_tree("<div><span></div>");
        let updated = update_tree(&tree, &edits(&[(1, "x")]));
        assert_eq!(updated, tree);
    }
}

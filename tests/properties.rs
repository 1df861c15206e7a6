//! Property tests for the tree/chunk round trip.
//!
//! Documents are generated as explicit start/end tag pairs with plain text,
//! so they parse without repair and render back byte-for-byte.

use std::collections::BTreeMap;

use proptest::prelude::*;

use htmlchunk::chunk::{ChunkConfig, EditMap, extract_chunks};
use htmlchunk::render::render;
use htmlchunk::tree::{Node, NodeId, build_tree};
use htmlchunk::update::update_tree;

const TAGS: &[&str] = &["div", "p", "span", "b", "i", "em", "ul", "li", "a", "br", "script"];

#[derive(Debug, Clone)]
enum Fragment {
    Text(String),
    Element {
        tag: &'static str,
        attrs: BTreeMap<String, String>,
        children: Vec<Fragment>,
    },
}

fn fragment() -> impl Strategy<Value = Fragment> {
    let leaf = "[a-zA-Z0-9 .,!?çğüÖ]{1,12}".prop_map(Fragment::Text);
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            prop::sample::select(TAGS),
            prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9 ]{0,8}", 0..3),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(tag, attrs, children)| Fragment::Element {
                tag,
                attrs,
                children,
            })
    })
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 1..4).prop_map(|fragments| {
        let mut html = String::new();
        for f in &fragments {
            write_fragment(f, &mut html);
        }
        html
    })
}

fn write_fragment(fragment: &Fragment, out: &mut String) {
    match fragment {
        Fragment::Text(text) => out.push_str(text),
        Fragment::Element {
            tag,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
            out.push('>');
            for child in children {
                write_fragment(child, out);
            }
            out.push_str(&format!("</{tag}>"));
        }
    }
}

/// Check the post-order invariant below `node`, returning the largest id seen.
fn assert_post_order(node: &Node) -> u32 {
    let mut max_below = 0;
    for child in node.children() {
        max_below = max_below.max(assert_post_order(child));
    }
    assert!(
        node.id().0 > max_below,
        "node {} is not greater than its descendants",
        node.id()
    );
    node.id().0
}

fn concat(chunks: &[htmlchunk::Chunk]) -> String {
    chunks.iter().map(ToString::to_string).collect()
}

proptest! {
    #[test]
    fn prop_render_reproduces_source(html in document()) {
        prop_assert_eq!(render(&build_tree(&html)), html);
    }

    #[test]
    fn prop_ids_are_unique_and_post_ordered(html in document()) {
        let tree = build_tree(&html);
        prop_assume!(tree.as_element().map(|e| e.tag == "root").unwrap_or(false));

        let mut ids: Vec<u32> = tree.descendants().map(|n| n.id().0).collect();
        ids.sort_unstable();
        let expected: Vec<u32> = (1..=ids.len() as u32).collect();
        prop_assert_eq!(ids, expected);

        assert_post_order(&tree);
    }

    #[test]
    fn prop_size_limit_only_adds_boundaries(html in document(), max_chars in 1usize..40) {
        let tree = build_tree(&html);
        let whole: String = extract_chunks(&tree, &ChunkConfig::default())
            .into_iter()
            .map(|c| c.text)
            .collect();
        let split: String = extract_chunks(&tree, &ChunkConfig::new().with_max_chars(max_chars))
            .into_iter()
            .map(|c| c.text)
            .collect();
        prop_assert_eq!(split, whole);
    }

    #[test]
    fn prop_unedited_round_trip_is_identity(html in document(), max_chars in 1usize..40) {
        let tree = build_tree(&html);
        let chunks = extract_chunks(&tree, &ChunkConfig::new().with_max_chars(max_chars));
        let edits = EditMap::parse(&concat(&chunks));
        prop_assert_eq!(update_tree(&tree, &edits), tree);
    }

    #[test]
    fn prop_single_edit_touches_one_node(html in document(), pick in any::<prop::sample::Index>()) {
        let tree = build_tree(&html);
        let texts: Vec<NodeId> = tree
            .descendants()
            .filter_map(Node::as_text)
            .map(|t| t.id)
            .collect();
        prop_assume!(!texts.is_empty());
        let target = texts[pick.index(texts.len())];

        let mut edits = EditMap::new();
        edits.insert(target, "EDITED");
        let updated = update_tree(&tree, &edits);

        for node in updated.descendants() {
            let before = tree.find(node.id()).unwrap();
            match (node, before) {
                (Node::Text(after), Node::Text(_)) if after.id == target => {
                    prop_assert_eq!(after.text.as_str(), "EDITED");
                }
                (Node::Text(after), Node::Text(before)) => {
                    prop_assert_eq!(&after.text, &before.text);
                }
                (Node::Element(after), Node::Element(before)) => {
                    prop_assert_eq!(&after.tag, &before.tag);
                    prop_assert_eq!(&after.attributes, &before.attributes);
                    prop_assert_eq!(after.is_editable, before.is_editable);
                }
                _ => prop_assert!(false, "node kind changed for {}", node.id()),
            }
        }
    }
}

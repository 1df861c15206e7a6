//! Tree → HTML rendering.
//!
//! Walks the tree and emits tags with their stored attributes. The synthetic
//! `root` wrapper and the `rawHtml` fallback are transparent at the top of the
//! tree: only their content is written. Nothing is validated; trees are
//! expected to come from [`crate::tree::build_tree`] or
//! [`crate::update::update_tree`].

use crate::normalize::restore_ampersands;
use crate::tree::{Content, Element, Node, RAW_HTML_TAG, ROOT_TAG};

/// Render a tree back to markup.
///
/// # Examples
///
/// ```
/// use htmlchunk::render::render;
/// use htmlchunk::tree::build_tree;
///
/// let tree = build_tree(r#"<p class="x">Hello <b>world</b></p>"#);
/// assert_eq!(render(&tree), r#"<p class="x">Hello <b>world</b></p>"#);
/// ```
pub fn render(tree: &Node) -> String {
    let mut out = String::new();

    match tree {
        Node::Element(e) if e.tag == ROOT_TAG || e.tag == RAW_HTML_TAG => {
            write_content(&e.content, &mut out);
        }
        node => write_node(node, &mut out),
    }

    restore_ampersands(out)
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&t.text),
        Node::Element(e) => write_element(e, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out.push('>');

    write_content(&element.content, out);

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn write_content(content: &Content, out: &mut String) {
    match content {
        Content::Children(children) => {
            for child in children {
                write_node(child, out);
            }
        }
        Content::Text(text) => out.push_str(text),
    }
}

//! Build a [`Node`] tree from HTML markup.
//!
//! The markup is normalized, wrapped in a synthetic `<root>` element and read
//! with quick-xml. Ids come from a counter owned by one build, and are handed
//! out in post-order: text runs get theirs as they close, elements get theirs
//! once all of their children have been built.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use super::node::{Attributes, Content, Element, Node, NodeId, RAW_HTML_TAG, ROOT_TAG, Text};
use crate::normalize::normalize_markup;

/// Tags whose content is never offered for editing.
pub const NON_EDITABLE_TAGS: &[&str] = &["img", "video", "meta", "script", "style", "br", "hr"];

/// Deepest element nesting accepted, counting the `root` wrapper.
///
/// Each tree level is two levels of JSON nesting (node object and content
/// array), and `serde_json` refuses input nested 128 levels or more. Deeper
/// markup is kept as `rawHtml` so every built tree can be read back.
pub const MAX_DEPTH: usize = 63;

/// Why a fragment could not be read as a tree.
#[derive(Error, Debug)]
pub(crate) enum MarkupError {
    #[error("XML error near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unexpected end tag </{0}>")]
    UnexpectedEnd(String),

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("content after the document root")]
    TrailingContent,

    #[error("elements nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Convert HTML markup into a tree.
///
/// Never fails: markup that cannot be read even after normalization becomes a
/// single non-editable `rawHtml` element holding the input unchanged.
///
/// # Examples
///
/// ```
/// use htmlchunk::tree::build_tree;
///
/// let tree = build_tree("<p>Hello <b>world</b></p>");
/// assert_eq!(tree.id().to_string(), "00005");
/// assert_eq!(tree.children()[0].children().len(), 2);
/// ```
pub fn build_tree(html: &str) -> Node {
    match TreeBuilder::new().build(html) {
        Ok(tree) => {
            tracing::debug!("built tree with {} nodes", tree.id().0);
            tree
        }
        Err(err) => {
            tracing::warn!("markup could not be parsed, keeping it as raw HTML: {err}");
            raw_html_node(html)
        }
    }
}

/// The passthrough node used when parsing fails.
pub fn raw_html_node(html: &str) -> Node {
    Node::Element(Element {
        id: NodeId(1),
        tag: RAW_HTML_TAG.to_string(),
        attributes: Attributes::new(),
        is_editable: false,
        content: Content::Text(html.to_string()),
    })
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    tag: String,
    attributes: Attributes,
    children: Vec<Node>,
    has_child_element: bool,
}

impl OpenElement {
    fn is_editable(&self) -> bool {
        if NON_EDITABLE_TAGS.contains(&self.tag.to_ascii_lowercase().as_str()) {
            return false;
        }
        if self.has_child_element {
            return false;
        }
        self.children
            .iter()
            .filter_map(Node::as_text)
            .any(|t| !t.text.trim().is_empty())
    }
}

/// State of one conversion: the id counter and the open-element stack.
struct TreeBuilder {
    next_id: u32,
    stack: Vec<OpenElement>,
    pending_text: String,
    finished: Option<Node>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            next_id: 1,
            stack: Vec::new(),
            pending_text: String::new(),
            finished: None,
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn build(mut self, html: &str) -> Result<Node, MarkupError> {
        let wrapped = format!("<{ROOT_TAG}>{}</{ROOT_TAG}>", normalize_markup(html));
        let mut reader = Reader::from_str(&wrapped);

        loop {
            let event = reader.read_event().map_err(|source| MarkupError::Xml {
                position: reader.buffer_position(),
                source,
            })?;

            match event {
                Event::Start(e) => self.open(&e)?,
                Event::Empty(e) => {
                    self.open(&e)?;
                    let tag = self.stack.last().map(|o| o.tag.clone()).unwrap_or_default();
                    self.close(&tag)?;
                }
                Event::End(e) => {
                    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                    self.close(&name)?;
                }
                Event::Text(e) => {
                    let text = std::str::from_utf8(&e)?;
                    self.push_text(text)?;
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e)?.to_string();
                    self.push_text(&text)?;
                }
                Event::GeneralRef(e) => {
                    let name = std::str::from_utf8(&e)?;
                    match resolve_predefined_entity(name) {
                        Some(resolved) => self.push_text(resolved)?,
                        None => self.push_text(&format!("&{name};"))?,
                    }
                }
                Event::Eof => break,
                // Comments, processing instructions and doctypes are dropped but
                // still separate the text around them
                _ => self.flush_text(),
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(MarkupError::Unclosed(open.tag.clone()));
        }
        self.finished
            .ok_or_else(|| MarkupError::Unclosed(ROOT_TAG.to_string()))
    }

    fn push_text(&mut self, text: &str) -> Result<(), MarkupError> {
        if text.is_empty() {
            return Ok(());
        }
        if self.stack.is_empty() {
            return Err(MarkupError::TrailingContent);
        }
        self.pending_text.push_str(text);
        Ok(())
    }

    /// Turn the accumulated text run into a text node of the innermost element.
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let id = self.alloc_id();
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(Node::Text(Text { id, text }));
        }
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<(), MarkupError> {
        if self.finished.is_some() {
            return Err(MarkupError::TrailingContent);
        }
        self.flush_text();
        if self.stack.len() >= MAX_DEPTH {
            return Err(MarkupError::TooDeep);
        }

        let tag = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attributes = Attributes::new();
        for attr in start.attributes() {
            let attr = attr?;
            let name = std::str::from_utf8(attr.key.as_ref())?;
            let raw = std::str::from_utf8(&attr.value)?;
            attributes.insert(name, unescape(raw)?.into_owned());
        }

        self.stack.push(OpenElement {
            tag,
            attributes,
            children: Vec::new(),
            has_child_element: false,
        });
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), MarkupError> {
        self.flush_text();

        let open = self
            .stack
            .pop()
            .ok_or_else(|| MarkupError::UnexpectedEnd(name.to_string()))?;
        if open.tag != name {
            return Err(MarkupError::UnexpectedEnd(name.to_string()));
        }

        // The wrapper is never an edit target, whatever its content.
        let is_editable = !self.stack.is_empty() && open.is_editable();
        let id = self.alloc_id();
        let element = Node::Element(Element {
            id,
            tag: open.tag,
            attributes: open.attributes,
            is_editable,
            content: Content::Children(open.children),
        });

        match self.stack.last_mut() {
            Some(parent) => {
                parent.has_child_element = true;
                parent.children.push(element);
            }
            None => self.finished = Some(element),
        }
        Ok(())
    }
}

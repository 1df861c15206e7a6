//! Tree node types and their JSON wire form.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag of the synthetic element wrapping every converted fragment.
pub const ROOT_TAG: &str = "root";

/// Tag of the passthrough element produced when markup cannot be parsed.
pub const RAW_HTML_TAG: &str = "rawHtml";

/// Value of the `type` field for text nodes.
pub const TEXT_TYPE: &str = "text";

/// Identifier of a node within one converted tree.
///
/// Ids are handed out by a per-conversion counter starting at 1 and are
/// written as five-digit, zero-padded strings (`"00042"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Number of digits in the textual form of an id.
    pub const WIDTH: usize = 5;

    /// Parse the five-digit textual form. Anything else is rejected.
    pub fn parse(s: &str) -> Option<NodeId> {
        if s.len() != Self::WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok().map(NodeId)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a zero-padded decimal node id",
            ));
        }
        s.parse().map(NodeId).map_err(de::Error::custom)
    }
}

/// Ordered attribute list with unique names.
///
/// Source order is kept so rendering reproduces the original tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute. An existing name keeps its position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of string attribute values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
                let mut attrs = Attributes::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    attrs.insert(name, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// Content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Child nodes in document order.
    Children(Vec<Node>),
    /// A single text payload that replaced the children after an edit was merged,
    /// or the raw input of a `rawHtml` fallback.
    Text(String),
}

impl Content {
    /// Child nodes, empty when the content is a text payload.
    pub fn children(&self) -> &[Node] {
        match self {
            Content::Children(children) => children,
            Content::Text(_) => &[],
        }
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: NodeId,
    pub tag: String,
    pub attributes: Attributes,
    pub is_editable: bool,
    pub content: Content,
}

/// A text node. Text is always editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub id: NodeId,
    pub text: String,
}

/// One node of a converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Element(e) => e.id,
            Node::Text(t) => t.id,
        }
    }

    pub fn is_editable(&self) -> bool {
        match self {
            Node::Element(e) => e.is_editable,
            Node::Text(_) => true,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Child nodes. Text nodes and text-payload elements have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(e) => e.content.children(),
            Node::Text(_) => &[],
        }
    }

    /// Iterate over this node and all descendants in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Find the node carrying `id`.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.descendants().find(|n| n.id() == id)
    }
}

/// Pre-order iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Text(text) => {
                let mut s = serializer.serialize_struct("Node", 4)?;
                s.serialize_field("id", &text.id)?;
                s.serialize_field("type", TEXT_TYPE)?;
                s.serialize_field("isEditable", &true)?;
                s.serialize_field("content", &text.text)?;
                s.end()
            }
            Node::Element(element) => {
                let mut s = serializer.serialize_struct("Node", 5)?;
                s.serialize_field("id", &element.id)?;
                s.serialize_field("type", &element.tag)?;
                s.serialize_field("attributes", &element.attributes)?;
                s.serialize_field("isEditable", &element.is_editable)?;
                match &element.content {
                    Content::Children(children) => s.serialize_field("content", children)?,
                    Content::Text(text) => s.serialize_field("content", text)?,
                }
                s.end()
            }
        }
    }
}

/// Loosely typed shape of a node as it appears on the wire.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    id: NodeId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    is_editable: bool,
    content: WireContent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireContent {
    Children(Vec<Node>),
    Text(String),
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireNode::deserialize(deserializer)?;

        if wire.kind == TEXT_TYPE {
            return match wire.content {
                WireContent::Text(text) => Ok(Node::Text(Text { id: wire.id, text })),
                WireContent::Children(_) => Err(de::Error::custom(format!(
                    "text node {} must have string content",
                    wire.id
                ))),
            };
        }

        if wire.kind.is_empty() {
            return Err(de::Error::custom(format!("node {} has an empty type", wire.id)));
        }

        let content = match wire.content {
            WireContent::Children(children) => Content::Children(children),
            WireContent::Text(text) => Content::Text(text),
        };

        Ok(Node::Element(Element {
            id: wire.id,
            tag: wire.kind,
            attributes: wire.attributes,
            is_editable: wire.is_editable,
            content,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::Element(Element {
            id: NodeId(3),
            tag: "p".to_string(),
            attributes: [("class", "lead"), ("id", "intro")].into_iter().collect(),
            is_editable: false,
            content: Content::Children(vec![
                Node::Text(Text {
                    id: NodeId(1),
                    text: "Hello ".to_string(),
                }),
                Node::Element(Element {
                    id: NodeId(2),
                    tag: "br".to_string(),
                    attributes: Attributes::new(),
                    is_editable: false,
                    content: Content::Children(Vec::new()),
                }),
            ]),
        })
    }

    #[test]
    fn test_node_id_display_is_zero_padded() {
        assert_eq!(NodeId(7).to_string(), "00007");
        assert_eq!(NodeId(12345).to_string(), "12345");
    }

    #[test]
    fn test_node_id_parse_requires_five_digits() {
        assert_eq!(NodeId::parse("00042"), Some(NodeId(42)));
        assert_eq!(NodeId::parse("0042"), None);
        assert_eq!(NodeId::parse("000042"), None);
        assert_eq!(NodeId::parse("00a42"), None);
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.insert("z", "1");
        attrs.insert("a", "2");
        attrs.insert("z", "3");

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("z", "3"), ("a", "2")]);
    }

    #[test]
    fn test_serialize_field_order_and_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with(
            r#"{"id":"00003","type":"p","attributes":{"class":"lead","id":"intro"},"isEditable":false,"content":["#
        ));
        assert!(json.contains(r#"{"id":"00001","type":"text","isEditable":true,"content":"Hello "}"#));
    }

    #[test]
    fn test_deserialize_restores_tree() {
        let node = sample();
        let json = serde_json::to_string(&node).unwrap();
        let parsed: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_deserialize_attribute_order_preserved() {
        let json = r##"{"id":"00001","type":"a","attributes":{"title":"t","href":"#x"},"isEditable":false,"content":[]}"##;
        let node: Node = serde_json::from_str(json).unwrap();
        let names: Vec<_> = node
            .as_element()
            .unwrap()
            .attributes
            .iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["title", "href"]);
    }

    #[test]
    fn test_deserialize_element_with_text_payload() {
        let json = r#"{"id":"00002","type":"b","isEditable":true,"content":"earth"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let element = node.as_element().unwrap();
        assert_eq!(element.content, Content::Text("earth".to_string()));
        assert!(element.attributes.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_text_with_children() {
        let json = r#"{"id":"00001","type":"text","isEditable":true,"content":[]}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_missing_id() {
        let json = r#"{"type":"p","isEditable":false,"content":[]}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let ids: Vec<_> = sample().descendants().map(|n| n.id().0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_find_by_id() {
        let tree = sample();
        assert_eq!(tree.find(NodeId(1)).and_then(Node::as_text).unwrap().text, "Hello ");
        assert!(tree.find(NodeId(99)).is_none());
    }
}

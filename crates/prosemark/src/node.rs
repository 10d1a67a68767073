//! ProseMirror-style document tree.
//!
//! This module provides the node structure the editor sends over the wire,
//! together with the decoder that builds it from raw JSON. The structure is
//! loose: unknown fields are ignored, missing fields take their
//! defaults and unknown node or mark types are kept so that the renderer can
//! decide what to do with them.

use indexmap::IndexMap;
use serde::de::{Deserializer, Error as _, Unexpected};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::DecodeError;

/// Heading level used when `attrs.level` is absent or unusable
pub const DEFAULT_HEADING_LEVEL: usize = 1;

/// Node types understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    CodeBlock,
    HardBreak,
    HorizontalRule,
    Text,
    /// Any type tag not listed above
    Unknown,
}

impl From<&str> for NodeKind {
    fn from(value: &str) -> Self {
        match value {
            "doc" => NodeKind::Doc,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList,
            "listItem" => NodeKind::ListItem,
            "blockquote" => NodeKind::Blockquote,
            "codeBlock" => NodeKind::CodeBlock,
            "hardBreak" => NodeKind::HardBreak,
            "horizontalRule" => NodeKind::HorizontalRule,
            "text" => NodeKind::Text,
            _ => NodeKind::Unknown,
        }
    }
}

/// Mark types understood by the mark composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    /// `bold` or `strong`
    Bold,
    /// `italic` or `em`
    Italic,
    Code,
    Link,
    Strikethrough,
    Unknown,
}

impl From<&str> for MarkKind {
    fn from(value: &str) -> Self {
        match value {
            "bold" | "strong" => MarkKind::Bold,
            "italic" | "em" => MarkKind::Italic,
            "code" => MarkKind::Code,
            "link" => MarkKind::Link,
            "strikethrough" => MarkKind::Strikethrough,
            _ => MarkKind::Unknown,
        }
    }
}

/// A single attribute value.
///
/// Arrays and objects are accepted while decoding but collapse into
/// [`AttrValue::Unsupported`], so exotic editor attributes never make a
/// document undecodable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Unsupported,
}

impl AttrValue {
    /// Get the value as a string slice, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the value as a number, if it is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as an integer. Fractional and non-finite numbers yield `None`.
    pub fn as_integer(&self) -> Option<i64> {
        let n = self.as_f64()?;
        if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            Some(n as i64)
        } else {
            None
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(AttrValue::Unsupported, AttrValue::Number),
            Value::String(s) => AttrValue::String(s),
            Value::Array(_) | Value::Object(_) => AttrValue::Unsupported,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Attribute mapping of a node or mark, in source order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Attrs(IndexMap<String, AttrValue>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value by name
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    /// Get a string attribute, falling back to `default` when absent or not a string
    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).and_then(AttrValue::as_str).unwrap_or(default)
    }

    /// Get an integral number attribute
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_integer)
    }

    /// Set an attribute, replacing any previous value
    pub fn insert(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A formatting mark attached to a text node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Mark {
    /// Mark type tag, e.g. `bold` or `link`
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub mark_type: String,

    #[serde(default, deserialize_with = "nullable")]
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark without attributes
    pub fn new(mark_type: &str) -> Self {
        Self {
            mark_type: mark_type.to_string(),
            attrs: Attrs::new(),
        }
    }

    /// Create a link mark pointing at `href`
    pub fn link(href: &str) -> Self {
        let mut mark = Self::new("link");
        mark.attrs.insert("href", href);
        mark
    }

    pub fn kind(&self) -> MarkKind {
        MarkKind::from(self.mark_type.as_str())
    }

    /// Link target; empty when `attrs.href` is missing or not a string
    pub fn href(&self) -> &str {
        self.attrs.str_or("href", "")
    }
}

/// A node of the document tree
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Node {
    /// Type tag, e.g. `paragraph` or `bulletList`
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub node_type: String,

    /// Child nodes, in document order
    #[serde(default, deserialize_with = "nullable")]
    pub content: Vec<Node>,

    /// Text payload of `text` nodes
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,

    /// Marks of `text` nodes; the first mark is rendered outermost
    #[serde(default, deserialize_with = "nullable")]
    pub marks: Vec<Mark>,

    #[serde(default, deserialize_with = "nullable")]
    pub attrs: Attrs,
}

impl Node {
    /// Create an empty node of the given type
    pub fn new(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            ..Self::default()
        }
    }

    /// Create a container node with the given children
    pub fn with_children(node_type: &str, children: Vec<Node>) -> Self {
        Self {
            node_type: node_type.to_string(),
            content: children,
            ..Self::default()
        }
    }

    /// Create an unmarked text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: "text".to_string(),
            text: content.to_string(),
            ..Self::default()
        }
    }

    /// Append a mark (builder style)
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Set an attribute (builder style)
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name, value);
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.content.push(child);
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from(self.node_type.as_str())
    }

    /// Heading level from `attrs.level`.
    ///
    /// Levels are not range-checked against Markdown's 1-6. Anything that is
    /// not a non-negative integer yields [`DEFAULT_HEADING_LEVEL`].
    pub fn heading_level(&self) -> usize {
        self.attrs
            .integer("level")
            .and_then(|level| usize::try_from(level).ok())
            .unwrap_or(DEFAULT_HEADING_LEVEL)
    }

    /// Info string of a code block, empty by default
    pub fn code_language(&self) -> &str {
        self.attrs.str_or("language", "")
    }
}

/// Treat an explicit JSON `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode raw JSON bytes into a document tree.
///
/// The top-level value must be a JSON object; bare strings, arrays and
/// scalars are rejected as malformed even though they are valid JSON.
pub fn decode(bytes: &[u8]) -> Result<Node, DecodeError> {
    debug!(bytes = bytes.len(), "decoding document tree");

    let value = parse_value(bytes).map_err(|err| {
        debug!(error = %err, "document is not valid JSON");
        DecodeError::Malformed(err)
    })?;

    if !value.is_object() {
        let err = serde_json::Error::invalid_type(unexpected(&value), &"a document node object");
        debug!(error = %err, "document root is not an object");
        return Err(DecodeError::Malformed(err));
    }

    Ok(Node::deserialize(serde_stacker::Deserializer::new(value))?)
}

/// Parse JSON with no nesting limit of its own.
///
/// Tree depth is bounded when rendering, by `Options::max_depth`; the stack
/// grows on demand while parsing.
fn parse_value(bytes: &[u8]) -> serde_json::Result<Value> {
    let mut json = serde_json::Deserializer::from_slice(bytes);
    json.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// `doc > (bulletList > listItem > [paragraph, ...]) x levels`
#[cfg(test)]
pub(crate) fn nested_list_json(levels: usize) -> String {
    let mut inner = String::new();
    for level in (0..levels).rev() {
        let nested = if inner.is_empty() {
            String::new()
        } else {
            format!(",{inner}")
        };
        inner = format!(
            r#"{{"type":"bulletList","content":[{{"type":"listItem","content":[{{"type":"paragraph","content":[{{"type":"text","text":"L{level}"}}]}}{nested}]}}]}}"#
        );
    }
    format!(r#"{{"type":"doc","content":[{inner}]}}"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_full_node() {
        let json = br#"{
            "type": "doc",
            "content": [
                {
                    "type": "heading",
                    "attrs": {"level": 2},
                    "content": [{"type": "text", "text": "Title"}]
                },
                {
                    "type": "paragraph",
                    "content": [
                        {"type": "text", "text": "x", "marks": [{"type": "bold"}, {"type": "link", "attrs": {"href": "https://example.com"}}]}
                    ]
                }
            ]
        }"#;

        let doc = decode(json).unwrap();
        assert_eq!(doc.kind(), NodeKind::Doc);
        assert_eq!(doc.content.len(), 2);
        assert_eq!(doc.content[0].heading_level(), 2);

        let text = &doc.content[1].content[0];
        assert_eq!(text.kind(), NodeKind::Text);
        assert_eq!(text.text, "x");
        assert_eq!(text.marks.len(), 2);
        assert_eq!(text.marks[0].kind(), MarkKind::Bold);
        assert_eq!(text.marks[1].href(), "https://example.com");
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let node = decode(br#"{"type": "paragraph"}"#).unwrap();
        assert!(node.content.is_empty());
        assert!(node.marks.is_empty());
        assert!(node.attrs.is_empty());
        assert_eq!(node.text, "");
    }

    #[test]
    fn test_decode_null_fields_as_absent() {
        let node = decode(br#"{"type": "paragraph", "content": null, "attrs": null, "marks": null}"#).unwrap();
        assert!(node.content.is_empty());
        assert!(node.attrs.is_empty());
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let node = decode(br#"{"type": "paragraph", "id": "abc", "meta": {"x": [1, 2]}}"#).unwrap();
        assert_eq!(node.kind(), NodeKind::Paragraph);
    }

    #[test]
    fn test_decode_missing_type_is_unknown() {
        let node = decode(br#"{"content": []}"#).unwrap();
        assert_eq!(node.node_type, "");
        assert_eq!(node.kind(), NodeKind::Unknown);
    }

    #[test]
    fn test_decode_malformed_json() {
        assert!(matches!(decode(b"{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b""), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_non_object_root() {
        let inputs: [&[u8]; 5] = [br#""plain text""#, b"[1, 2]", b"42", b"null", b"true"];
        for input in inputs {
            assert!(
                matches!(decode(input), Err(DecodeError::Malformed(_))),
                "expected rejection of {}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_decode_deeply_nested_list() {
        let doc = decode(super::nested_list_json(100).as_bytes()).unwrap();

        let mut levels = 0;
        let mut list = &doc.content[0];
        loop {
            assert_eq!(list.kind(), NodeKind::BulletList);
            levels += 1;
            match list.content[0].content.get(1) {
                Some(nested) => list = nested,
                None => break,
            }
        }
        assert_eq!(levels, 100);
    }

    #[test]
    fn test_decode_rejects_trailing_data() {
        assert!(matches!(
            decode(br#"{"type": "doc"} {"type": "doc"}"#),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_attr_value_shapes() {
        let node = decode(
            br#"{"type": "x", "attrs": {"s": "a", "n": 3, "f": 2.5, "b": true, "z": null, "arr": [1], "obj": {}}}"#,
        )
        .unwrap();
        let attrs = &node.attrs;
        assert_eq!(attrs.len(), 7);
        assert_eq!(attrs.get("s"), Some(&AttrValue::String("a".to_string())));
        assert_eq!(attrs.integer("n"), Some(3));
        assert_eq!(attrs.integer("f"), None);
        assert_eq!(attrs.get("b"), Some(&AttrValue::Bool(true)));
        assert_eq!(attrs.get("z"), Some(&AttrValue::Null));
        assert_eq!(attrs.get("arr"), Some(&AttrValue::Unsupported));
        assert_eq!(attrs.get("obj"), Some(&AttrValue::Unsupported));
        assert_eq!(attrs.str_or("n", "fallback"), "fallback");
    }

    #[test]
    fn test_heading_level_defaults() {
        assert_eq!(Node::new("heading").heading_level(), 1);
        assert_eq!(Node::new("heading").with_attr("level", 7_i64).heading_level(), 7);
        assert_eq!(Node::new("heading").with_attr("level", "2").heading_level(), 1);
        assert_eq!(Node::new("heading").with_attr("level", 2.5).heading_level(), 1);
        assert_eq!(Node::new("heading").with_attr("level", -3_i64).heading_level(), 1);
        assert_eq!(Node::new("heading").with_attr("level", 300_i64).heading_level(), 300);
        assert_eq!(Node::new("heading").with_attr("level", 0_i64).heading_level(), 0);
    }

    #[test]
    fn test_code_language_default() {
        assert_eq!(Node::new("codeBlock").code_language(), "");
        assert_eq!(Node::new("codeBlock").with_attr("language", "go").code_language(), "go");
        assert_eq!(Node::new("codeBlock").with_attr("language", 1_i64).code_language(), "");
    }

    #[test]
    fn test_mark_kinds() {
        assert_eq!(Mark::new("strong").kind(), MarkKind::Bold);
        assert_eq!(Mark::new("em").kind(), MarkKind::Italic);
        assert_eq!(Mark::new("underline").kind(), MarkKind::Unknown);
        assert_eq!(Mark::new("link").href(), "");
        assert_eq!(Mark::link("/a").href(), "/a");
    }

    #[test]
    fn test_builders() {
        let mut list = Node::new("bulletList");
        list.add_child(Node::with_children("listItem", vec![Node::text("a")]));
        assert_eq!(list.kind(), NodeKind::BulletList);
        assert_eq!(list.content[0].content[0].text, "a");
    }
}

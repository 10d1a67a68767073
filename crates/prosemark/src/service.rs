//! MarkdownService - the main entry point for document tree to Markdown conversion.

use crate::marks::apply_marks;
use crate::node::{decode, Mark, Node};
use crate::options::Options;
use crate::render::{render, render_inline};
use crate::Result;

/// The main service for converting document trees to Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownService {
    options: Options,
}

impl MarkdownService {
    /// Create a new MarkdownService with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MarkdownService with custom options
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Decode raw JSON bytes and render them to Markdown.
    ///
    /// Decode failures surface as [`ProsemarkError::Decode`](crate::ProsemarkError::Decode)
    /// so that callers can fall back to other payload shapes.
    pub fn convert(&self, bytes: &[u8]) -> Result<String> {
        let document = decode(bytes)?;
        self.render(&document)
    }

    /// Render an already decoded document tree
    pub fn render(&self, document: &Node) -> Result<String> {
        render(document, &self.options)
    }

    /// Render a run of inline nodes
    pub fn render_inline(&self, nodes: &[Node]) -> Result<String> {
        render_inline(nodes, &self.options)
    }

    /// Apply marks to a text run
    pub fn apply_marks(&self, text: &str, marks: &[Mark]) -> String {
        apply_marks(text, marks, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProsemarkError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_document() {
        let service = MarkdownService::new();
        let json = br#"{
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Meeting notes"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Discussed "},
                    {"type": "text", "text": "roadmap", "marks": [{"type": "bold"}]}
                ]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "ship v2"}]}]},
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "hire"}]}]}
                ]},
                {"type": "codeBlock", "attrs": {"language": "go"}, "content": [{"type": "text", "text": "fmt.Println()"}]}
            ]
        }"#;

        let markdown = service.convert(json).unwrap();
        assert_eq!(
            markdown,
            "# Meeting notes\n\nDiscussed **roadmap**\n\n- ship v2\n- hire\n\n```go\nfmt.Println()\n```\n"
        );
    }

    #[test]
    fn test_convert_malformed_is_decode_error() {
        let service = MarkdownService::new();
        let err = service.convert(b"{not json").unwrap_err();
        assert!(err.is_decode());
        assert!(matches!(err, ProsemarkError::Decode(_)));
    }

    #[test]
    fn test_convert_plain_string_is_decode_error() {
        let err = MarkdownService::new().convert(br#""just text""#).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_depth_error_is_not_decode_error() {
        let mut service = MarkdownService::new();
        service.options_mut().max_depth = 1;
        let err = service
            .convert(br#"{"type": "doc", "content": [{"type": "paragraph"}]}"#)
            .unwrap_err();
        assert!(!err.is_decode());
        assert!(matches!(err, ProsemarkError::DepthExceeded { limit: 1 }));
    }

    #[test]
    fn test_convert_deeply_nested_list() {
        let json = crate::node::nested_list_json(100);
        let markdown = MarkdownService::new().convert(json.as_bytes()).unwrap();

        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], "- L0");
        assert_eq!(lines[99], format!("{}- L99", " ".repeat(2 * 99)));
    }

    #[test]
    fn test_convert_beyond_max_depth() {
        let mut service = MarkdownService::new();
        service.options_mut().max_depth = 50;
        let err = service
            .convert(crate::node::nested_list_json(100).as_bytes())
            .unwrap_err();
        assert!(!err.is_decode());
        assert!(matches!(err, ProsemarkError::DepthExceeded { limit: 50 }));
    }

    #[test]
    fn test_unknown_root_without_content() {
        let markdown = MarkdownService::new()
            .convert(br#"{"type": "somethingNew"}"#)
            .unwrap();
        assert_eq!(markdown, "\n");
    }

    #[test]
    fn test_with_options() {
        let service = MarkdownService::with_options(Options {
            strong_delimiter: "__".to_string(),
            ..Default::default()
        });
        assert_eq!(service.options().strong_delimiter, "__");
        assert_eq!(service.apply_marks("x", &[Mark::new("bold")]), "__x__");
    }

    #[test]
    fn test_service_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarkdownService>();
    }
}

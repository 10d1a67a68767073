//! # prosemark
//!
//! Convert ProseMirror-style JSON document trees to Markdown.
//!
//! Note-taking editors store rich text as a tree of typed nodes (`doc`,
//! `paragraph`, `bulletList`, `text` with marks, ...). This crate decodes that
//! JSON and renders it as readable Markdown.
//!
//! ## Design
//!
//! ```text
//! JSON bytes ──decode──▶ Node tree ──render──▶ Markdown String
//!                                    │
//!                          inline runs + mark composition
//! ```
//!
//! - **Tolerant input**: unknown fields are ignored, unknown node types are
//!   passed through or dropped, unknown marks leave text untouched
//! - **Infallible rendering**: once decoded, the only failure is exceeding
//!   [`Options::max_depth`]
//! - **Distinct decode errors**: callers can tell a malformed payload apart and
//!   try another interpretation of the bytes
//!
//! ## Example
//!
//! ```rust
//! use prosemark::MarkdownService;
//!
//! let service = MarkdownService::new();
//! let json = br#"{"type":"doc","content":[
//!     {"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Title"}]},
//!     {"type":"paragraph","content":[{"type":"text","text":"x","marks":[{"type":"bold"},{"type":"italic"}]}]}
//! ]}"#;
//!
//! let markdown = service.convert(json).unwrap();
//! assert_eq!(markdown, "## Title\n\n**_x_**\n");
//! ```

mod marks;
pub mod node;
mod options;
mod render;
mod service;

pub use marks::apply_marks;
pub use node::{decode, AttrValue, Attrs, Mark, MarkKind, Node, NodeKind};
pub use options::{Options, DEFAULT_MAX_DEPTH};
pub use render::{render, render_inline};
pub use service::MarkdownService;

/// Failure to turn raw bytes into a document tree
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Invalid JSON, or a top-level value that is not a node object
    #[error("malformed document JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error type for prosemark operations
#[derive(Debug, thiserror::Error)]
pub enum ProsemarkError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("document nesting exceeds the limit of {limit} levels")]
    DepthExceeded { limit: usize },
}

impl ProsemarkError {
    /// Whether the input could not be decoded at all
    pub fn is_decode(&self) -> bool {
        matches!(self, ProsemarkError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, ProsemarkError>;

/// Convert raw document JSON to Markdown with default options
pub fn to_markdown(bytes: &[u8]) -> Result<String> {
    MarkdownService::new().convert(bytes)
}

//! Configuration options for Markdown rendering

use serde::Deserialize;

/// Default ceiling on document tree nesting
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Options for Markdown rendering.
///
/// The defaults produce the canonical output: `- ` bullets, `---` rules,
/// backtick fences, `_` emphasis, `**` strong and `~~` strikethrough.
/// Every field may be omitted when loading options from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Horizontal rule string
    pub hr: String,

    /// Fence string for code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Strikethrough delimiter
    pub strike_delimiter: String,

    /// Spaces of indentation per list nesting level
    pub list_indent: usize,

    /// Maximum nesting of the document tree before rendering gives up
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bullet_list_marker: '-',
            hr: "---".to_string(),
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            strike_delimiter: "~~".to_string(),
            list_indent: 2,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

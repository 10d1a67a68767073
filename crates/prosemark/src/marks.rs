//! Mark composition for text runs.

use tracing::trace;

use crate::node::{Mark, MarkKind};
use crate::options::Options;

/// Wrap `text` in the Markdown delimiters of `marks`.
///
/// The first mark ends up as the outermost delimiter pair, so `[bold, italic]`
/// renders as `**_x_**`. Unknown marks leave the text untouched. A `code` mark
/// combined with other marks still nests their delimiters, even though a code
/// span will show them literally.
pub fn apply_marks(text: &str, marks: &[Mark], options: &Options) -> String {
    let mut result = text.to_string();
    let mut buf = [0u8; 4];
    let em = options.em_delimiter.encode_utf8(&mut buf);

    for mark in marks.iter().rev() {
        result = match mark.kind() {
            MarkKind::Bold => wrap(&result, &options.strong_delimiter),
            MarkKind::Italic => wrap(&result, em),
            MarkKind::Code => wrap(&result, "`"),
            MarkKind::Link => format!("[{}]({})", result, mark.href()),
            MarkKind::Strikethrough => wrap(&result, &options.strike_delimiter),
            MarkKind::Unknown => {
                trace!(mark_type = %mark.mark_type, "ignoring unknown mark");
                continue;
            }
        };
    }

    result
}

fn wrap(inner: &str, delimiter: &str) -> String {
    let mut out = String::with_capacity(inner.len() + delimiter.len() * 2);
    out.push_str(delimiter);
    out.push_str(inner);
    out.push_str(delimiter);
    out
}

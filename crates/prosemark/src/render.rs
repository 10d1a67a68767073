//! Markdown rendering of a document tree.
//!
//! Block nodes are written line by line into a single output buffer, with
//! `depth` tracking list nesting for indentation. Inline runs are rendered in
//! place and text nodes go through the mark composer.

use tracing::trace;

use crate::marks::apply_marks;
use crate::node::{Node, NodeKind};
use crate::options::Options;
use crate::{ProsemarkError, Result};

/// Render a document tree to Markdown.
///
/// The output always ends with exactly one newline.
pub fn render(root: &Node, options: &Options) -> Result<String> {
    let mut output = String::with_capacity(4096);
    Renderer::new(options).render_block(root, 0, &mut output)?;

    normalize_trailing(&mut output);
    Ok(output)
}

/// Render a run of inline nodes to a single string
pub fn render_inline(nodes: &[Node], options: &Options) -> Result<String> {
    let mut output = String::new();
    Renderer::new(options).render_inlines(nodes, &mut output)?;
    Ok(output)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
    Bullet,
    Ordered,
}

struct Renderer<'a> {
    options: &'a Options,
    /// Current nesting of the tree walk, checked against `max_depth`
    nesting: usize,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a Options) -> Self {
        Self {
            options,
            nesting: 0,
        }
    }

    /// Run `f` one tree level deeper
    fn nested<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.nesting >= self.options.max_depth {
            return Err(ProsemarkError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn render_block(&mut self, node: &Node, depth: usize, out: &mut String) -> Result<()> {
        self.nested(|r| r.dispatch(node, depth, out))
    }

    fn render_blocks(&mut self, nodes: &[Node], depth: usize, out: &mut String) -> Result<()> {
        for node in nodes {
            self.render_block(node, depth, out)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, node: &Node, depth: usize, out: &mut String) -> Result<()> {
        match node.kind() {
            NodeKind::Doc => self.render_blocks(&node.content, depth, out)?,

            NodeKind::Paragraph => {
                self.render_inlines(&node.content, out)?;
                out.push_str("\n\n");
            }

            NodeKind::Heading => {
                push_repeated(out, '#', node.heading_level());
                out.push(' ');
                self.render_inlines(&node.content, out)?;
                out.push_str("\n\n");
            }

            NodeKind::BulletList => self.render_list(&node.content, ListStyle::Bullet, depth, out)?,

            NodeKind::OrderedList => {
                self.render_list(&node.content, ListStyle::Ordered, depth, out)?
            }

            // An item outside of any list still reads best as a bullet
            NodeKind::ListItem => {
                let prefix = self.list_prefix(ListStyle::Bullet, 0);
                self.render_list_item(node, &prefix, depth, out)?;
            }

            NodeKind::Blockquote => self.render_blockquote(node, depth, out)?,

            NodeKind::CodeBlock => self.render_code_block(node, out)?,

            NodeKind::HardBreak => out.push('\n'),

            NodeKind::HorizontalRule => {
                out.push_str(&self.options.hr);
                out.push_str("\n\n");
            }

            NodeKind::Text => out.push_str(&apply_marks(&node.text, &node.marks, self.options)),

            NodeKind::Unknown => {
                if node.content.is_empty() {
                    trace!(node_type = %node.node_type, "dropping unknown leaf node");
                } else {
                    trace!(node_type = %node.node_type, "passing through unknown node");
                    self.render_blocks(&node.content, depth, out)?;
                }
            }
        }

        Ok(())
    }

    fn list_prefix(&self, style: ListStyle, index: usize) -> String {
        match style {
            ListStyle::Bullet => format!("{} ", self.options.bullet_list_marker),
            ListStyle::Ordered => format!("{}. ", index + 1),
        }
    }

    fn render_list(
        &mut self,
        items: &[Node],
        style: ListStyle,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        for (index, item) in items.iter().enumerate() {
            let prefix = self.list_prefix(style, index);
            self.nested(|r| r.render_list_item(item, &prefix, depth, out))?;
        }

        // Nested lists rely on the enclosing item for spacing
        if depth == 0 {
            out.push('\n');
        }

        Ok(())
    }

    fn render_list_item(
        &mut self,
        item: &Node,
        prefix: &str,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        let indent_width = depth * self.options.list_indent;

        for (position, child) in item.content.iter().enumerate() {
            match child.kind() {
                NodeKind::Paragraph => {
                    push_repeated(out, ' ', indent_width);
                    if position == 0 {
                        out.push_str(prefix);
                    } else {
                        // Continuation paragraphs align under the item text
                        push_repeated(out, ' ', prefix.chars().count());
                    }
                    self.nested(|r| r.render_inlines(&child.content, out))?;
                    out.push('\n');
                }

                NodeKind::BulletList => self.nested(|r| {
                    r.render_list(&child.content, ListStyle::Bullet, depth + 1, out)
                })?,

                NodeKind::OrderedList => self.nested(|r| {
                    r.render_list(&child.content, ListStyle::Ordered, depth + 1, out)
                })?,

                _ => {
                    if position == 0 {
                        push_repeated(out, ' ', indent_width);
                        out.push_str(prefix);
                    }
                    self.render_block(child, depth, out)?;
                }
            }
        }

        Ok(())
    }

    fn render_blockquote(&mut self, node: &Node, depth: usize, out: &mut String) -> Result<()> {
        let mut inner = String::new();
        self.render_blocks(&node.content, depth, &mut inner)?;

        for line in inner.trim_end_matches('\n').split('\n') {
            out.push_str("> ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');

        Ok(())
    }

    fn render_code_block(&mut self, node: &Node, out: &mut String) -> Result<()> {
        out.push_str(&self.options.fence);
        out.push_str(node.code_language());
        out.push('\n');
        self.render_raw(&node.content, out)?;
        out.push('\n');
        out.push_str(&self.options.fence);
        out.push_str("\n\n");
        Ok(())
    }

    /// Text content without marks, used inside code blocks.
    ///
    /// Block children are separated from their neighbours by a line break.
    fn render_raw(&mut self, nodes: &[Node], out: &mut String) -> Result<()> {
        let mut previous_block = false;

        for (index, node) in nodes.iter().enumerate() {
            let kind = node.kind();
            let is_block = !matches!(kind, NodeKind::Text | NodeKind::HardBreak);
            if index > 0 && (is_block || previous_block) {
                out.push('\n');
            }

            match kind {
                NodeKind::Text => out.push_str(&node.text),
                NodeKind::HardBreak => out.push('\n'),
                _ => self.nested(|r| r.render_raw(&node.content, out))?,
            }
            previous_block = is_block;
        }
        Ok(())
    }

    fn render_inlines(&mut self, nodes: &[Node], out: &mut String) -> Result<()> {
        for node in nodes {
            match node.kind() {
                NodeKind::Text => out.push_str(&apply_marks(&node.text, &node.marks, self.options)),
                NodeKind::HardBreak => out.push('\n'),
                // Block content where inline content was expected
                _ => self.render_block(node, 0, out)?,
            }
        }
        Ok(())
    }
}

fn push_repeated(out: &mut String, c: char, count: usize) {
    out.extend(std::iter::repeat(c).take(count));
}

/// Trim trailing whitespace and terminate with a single newline, in place
fn normalize_trailing(s: &mut String) {
    let len = s.trim_end().len();
    s.truncate(len);
    s.push('\n');
}

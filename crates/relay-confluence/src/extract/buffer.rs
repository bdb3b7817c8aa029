//! Output buffer with block and inline spacing rules.

use super::cleanup::collapse_whitespace;

/// Growing output of a walker.
///
/// Inline text is whitespace-collapsed; block boundaries are expressed as
/// line and paragraph breaks that never stack.
#[derive(Debug, Default)]
pub(crate) struct TextBuffer {
    out: String,
}

impl TextBuffer {
    pub(crate) fn as_str(&self) -> &str {
        &self.out
    }

    pub(crate) fn take(&mut self) -> String {
        std::mem::take(&mut self.out)
    }

    pub(crate) fn replace(&mut self, content: String) -> String {
        std::mem::replace(&mut self.out, content)
    }

    pub(crate) fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Append inline text, collapsing whitespace.
    pub(crate) fn push_inline(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let collapsed = collapse_whitespace(text);
        if self.at_line_start() || self.out.ends_with(' ') {
            self.out.push_str(collapsed.trim_start());
        } else {
            self.out.push_str(&collapsed);
        }
    }

    /// Append text verbatim.
    pub(crate) fn push_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(len);
    }

    /// Terminate the current line.
    pub(crate) fn line_break(&mut self) {
        self.trim_trailing_spaces();
        self.out.push('\n');
    }

    /// Terminate the current line unless already at a line start.
    pub(crate) fn ensure_line_start(&mut self) {
        if !self.at_line_start() {
            self.line_break();
        }
    }

    /// Separate blocks by exactly one blank line.
    pub(crate) fn block_break(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
    }

    /// Append a list item.
    ///
    /// Continuation lines of `body` are aligned under the item text; lines
    /// that are already indented (nested lists) are kept as they are.
    pub(crate) fn push_item(&mut self, indent: &str, marker: &str, body: &str) {
        self.ensure_line_start();
        self.out.push_str(indent);
        self.out.push_str(marker);

        let continuation = format!("{indent}{}", " ".repeat(marker.chars().count()));
        for (index, line) in body.trim().lines().enumerate() {
            if index > 0 {
                self.out.push('\n');
                if !line.is_empty() && !line.starts_with(' ') {
                    self.out.push_str(&continuation);
                }
            }
            self.out.push_str(line);
        }
        self.line_break();
    }

    /// Append `body` with every line prefixed (blockquotes).
    pub(crate) fn push_prefixed(&mut self, prefix: &str, body: &str) {
        self.block_break();
        for line in body.trim().lines() {
            if line.is_empty() {
                self.out.push_str(prefix.trim_end());
            } else {
                self.out.push_str(prefix);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
        self.block_break();
    }
}

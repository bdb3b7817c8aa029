//! Markdown rendition of storage-format bodies and markdown section splitting.

use std::sync::LazyLock;

use regex::Regex;

use super::buffer::TextBuffer;
use super::builder::SectionBuilder;
use super::cleanup::{clean_text, collapse_whitespace, fence_marker, is_fence_close, single_line};
use super::elements::{
    AdfContent, MacroKind, adf_content, adf_items, classify_macro, is_block, is_skipped,
    link_body, link_label, link_url, pre_language, row_cells, table_rows, task_complete,
};
use super::{Section, SectionOptions};
use crate::error::ExtractError;
use crate::storage::{TreeNode, parse_storage};

/// ATX heading: `#`..`######`, a space, text and optional closing hashes.
static ATX_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").expect("invalid ATX heading regex")
});

/// Inline link or image syntax, keeping the label.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[((?:[^\]\\]|\\.)*)\]\([^)]*\)").expect("invalid link regex")
});

/// Text at a line start that markdown would read as a block construct.
static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#{1,6}(?:\s|$)|>|[-+](?:\s|$)|-+\s*$|=+\s*$)")
        .expect("invalid block start regex")
});

/// Text at a line start that markdown would read as an ordered list item.
static ORDERED_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[.)](?:\s|$)").expect("invalid ordered start regex"));

/// Convert a storage-format body to GitHub-flavored markdown.
///
/// # Errors
///
/// Returns an error if the body cannot be parsed.
pub fn to_markdown(html: &str) -> Result<String, ExtractError> {
    let root = parse_storage(html)?;
    let mut walker = MarkdownWalker::default();
    walker.render_children(&root);
    Ok(clean_text(walker.buf.as_str()))
}

/// Split markdown into sections on ATX headings.
///
/// Headings inside fenced code blocks are ignored. Headings deeper than the
/// target level stay in the section content.
#[must_use]
pub fn split_markdown(markdown: &str, options: &SectionOptions) -> Vec<Section> {
    let mut builder = SectionBuilder::new(options);
    let mut content = String::new();
    let mut fence: Option<String> = None;

    for line in markdown.lines() {
        if let Some(marker) = &fence {
            if is_fence_close(line, marker) {
                fence = None;
            }
        } else if let Some(marker) = fence_marker(line) {
            fence = Some(marker);
        } else if let Some((level, title)) = parse_heading(line) {
            if title.is_empty() {
                continue;
            }
            if builder.starts_section(level) {
                builder.start_section(level, &title, &content);
                content.clear();
                continue;
            }
        }
        content.push_str(line);
        content.push('\n');
    }

    builder.finish(&content)
}

/// Level and plain title of an ATX heading line.
fn parse_heading(line: &str) -> Option<(u8, String)> {
    let caps = ATX_HEADING_RE.captures(line)?;
    let level = u8::try_from(caps[1].len()).ok()?;
    Some((level, plain_title(&caps[2])))
}

/// Strip inline markup from a heading title and resolve backslash escapes.
fn plain_title(title: &str) -> String {
    let title = LINK_RE.replace_all(title, "$1");
    let mut out = String::with_capacity(title.len());
    let mut chars = title.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek().is_some_and(char::is_ascii_punctuation) => {
                out.extend(chars.next());
            }
            '*' | '`' => {}
            '~' if chars.peek() == Some(&'~') => {
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    single_line(&out)
}

/// Escape characters that markdown would read as inline markup.
fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' | '*' | '_' | '`' | '[' | ']' => {
                out.push('\\');
                out.push(ch);
            }
            '~' if chars.peek() == Some(&'~') => out.push_str("\\~"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a block construct (heading, quote, list marker, rule) at the
/// start of a line.
fn escape_line_start(text: &str) -> String {
    let body = text.trim_start();
    let lead = &text[..text.len() - body.len()];
    if let Some(caps) = ORDERED_START_RE.captures(body) {
        let digits = caps[1].len();
        format!("{lead}{}\\{}", &body[..digits], &body[digits..])
    } else if BLOCK_START_RE.is_match(body) {
        format!("{lead}\\{body}")
    } else {
        text.to_owned()
    }
}

/// Longest run of backticks in `text`.
fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

#[derive(Default)]
struct MarkdownWalker {
    buf: TextBuffer,
    list_depth: usize,
    capture_depth: usize,
}

impl MarkdownWalker {
    fn render_children(&mut self, node: &TreeNode) {
        self.push_text(&node.text);
        for child in &node.children {
            self.render_node(child);
            self.push_text(&child.tail);
        }
    }

    /// Append document text with markdown syntax escaped.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let escaped = escape_inline(text);
        if self.buf.at_line_start() {
            self.buf.push_inline(&escape_line_start(&escaped));
        } else {
            self.buf.push_inline(&escaped);
        }
    }

    fn capture(&mut self, f: impl FnOnce(&mut Self)) -> String {
        let saved = self.buf.take();
        self.capture_depth += 1;
        f(self);
        self.capture_depth -= 1;
        self.buf.replace(saved)
    }

    fn render_node(&mut self, node: &TreeNode) {
        if let Some(level) = node.heading_level() {
            self.heading(node, level);
            return;
        }
        if let Some(name) = node.macro_name() {
            self.structured_macro(node, name);
            return;
        }

        let tag = node.tag.to_ascii_lowercase();
        match tag.as_str() {
            t if is_skipped(t) => {}
            t if is_block(t) => self.block(node),
            "blockquote" => {
                let body = self.capture(|w| w.render_children(node));
                self.buf.push_prefixed("> ", &body);
            }
            "br" => self.buf.line_break(),
            "hr" => {
                self.buf.block_break();
                self.buf.push_raw("---");
                self.buf.block_break();
            }
            "strong" | "b" => self.span(node, "**", "**"),
            "em" | "i" => self.span(node, "_", "_"),
            "del" | "s" | "strike" => self.span(node, "~~", "~~"),
            "code" => self.inline_code(&node.text_content()),
            "a" => self.anchor(node),
            "ul" => self.list(node, false),
            "ol" => self.list(node, true),
            "ac:task-list" => self.task_list(node),
            "table" => self.table(node),
            "pre" => {
                let language = pre_language(node);
                self.fenced(&node.text_content(), language.as_deref());
            }
            "ac:link" => self.link(node),
            "ac:image" => self.image(node),
            "img" => {
                if let Some(src) = node.attr("src") {
                    let alt = node.attr("alt").unwrap_or_default();
                    self.buf.push_inline(&format!("![{alt}]({src})"));
                }
            }
            "ac:emoticon" => {
                if let Some(fallback) = node.attr("emoji-fallback") {
                    self.buf.push_inline(fallback);
                }
            }
            "time" => {
                if let Some(datetime) = node.attr("datetime") {
                    self.buf.push_inline(datetime);
                }
            }
            "ac:adf-extension" => self.adf_extension(node),
            t if t.starts_with("ri:") => {}
            _ => self.render_children(node),
        }
    }

    fn heading(&mut self, node: &TreeNode, level: u8) {
        let title = single_line(&node.text_content());
        if title.is_empty() {
            return;
        }
        let title = escape_inline(&title);
        self.buf.block_break();
        if self.capture_depth == 0 {
            let hashes = "#".repeat(usize::from(level));
            self.buf.push_raw(&format!("{hashes} {title}"));
        } else {
            self.buf.push_inline(&format!("**{title}**"));
        }
        self.buf.block_break();
    }

    fn block(&mut self, node: &TreeNode) {
        self.buf.block_break();
        self.render_children(node);
        self.buf.block_break();
    }

    /// Emit an inline span wrapped in `open`/`close`, keeping surrounding spaces
    /// outside the markers.
    fn span(&mut self, node: &TreeNode, open: &str, close: &str) {
        let raw = node.text_content();
        let inner = single_line(&self.capture(|w| w.render_children(node)));
        self.wrapped(&raw, &format!("{open}{inner}{close}"), inner.is_empty());
    }

    fn wrapped(&mut self, raw: &str, rendered: &str, empty: bool) {
        if raw.starts_with(char::is_whitespace) {
            self.buf.push_inline(" ");
        }
        if !empty {
            self.buf.push_inline(rendered);
        }
        if raw.ends_with(char::is_whitespace) {
            self.buf.push_inline(" ");
        }
    }

    fn inline_code(&mut self, text: &str) {
        let code = collapse_whitespace(text);
        let code = code.trim();
        if code.is_empty() {
            return;
        }
        if code.contains('`') {
            self.buf.push_inline(&format!("`` {code} ``"));
        } else {
            self.buf.push_inline(&format!("`{code}`"));
        }
    }

    fn anchor(&mut self, node: &TreeNode) {
        let raw = node.text_content();
        let label = single_line(&self.capture(|w| w.render_children(node)));
        match node.attr("href").filter(|h| !h.is_empty()) {
            Some(href) => {
                let label = if label.is_empty() { href } else { label.as_str() };
                self.wrapped(&raw, &format!("[{label}]({href})"), false);
            }
            None => self.wrapped(&raw, &label, label.is_empty()),
        }
    }

    fn link(&mut self, node: &TreeNode) {
        let label = match link_body(node) {
            Some(body) => single_line(&self.capture(|w| w.render_children(body))),
            None => link_label(node).map(|l| escape_inline(&l)).unwrap_or_default(),
        };
        match link_url(node) {
            Some(url) => {
                let label = if label.is_empty() { url } else { label.as_str() };
                self.buf.push_inline(&format!("[{label}]({url})"));
            }
            None if !label.is_empty() => self.buf.push_inline(&label),
            None => {}
        }
    }

    fn image(&mut self, node: &TreeNode) {
        let src = node
            .child("attachment")
            .and_then(|a| a.attr("filename"))
            .or_else(|| node.child("url").and_then(|u| u.attr("value")));
        if let Some(src) = src {
            let alt = node.attr("alt").unwrap_or_default();
            self.buf.push_inline(&format!("![{alt}]({src})"));
        }
    }

    fn fenced(&mut self, body: &str, language: Option<&str>) {
        let body = body.trim_matches(['\n', '\r']);
        if body.trim().is_empty() {
            return;
        }
        let fence = "`".repeat(3.max(longest_backtick_run(body) + 1));
        let language = language.unwrap_or_default();
        self.buf.block_break();
        self.buf
            .push_raw(&format!("{fence}{language}\n{body}\n{fence}"));
        self.buf.block_break();
    }

    fn list(&mut self, node: &TreeNode, ordered: bool) {
        let start = node
            .attr("start")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1);
        let items = node
            .children_named("li")
            .enumerate()
            .map(|(i, item)| {
                let marker = if ordered {
                    format!("{}. ", start + i)
                } else {
                    "- ".to_owned()
                };
                (marker, item)
            })
            .collect();
        self.items(items);
    }

    fn task_list(&mut self, node: &TreeNode) {
        let items = node
            .children_named("task")
            .filter_map(|task| {
                let body = task.child("task-body")?;
                let marker = if task_complete(task) { "- [x] " } else { "- [ ] " };
                Some((marker.to_owned(), body))
            })
            .collect();
        self.items(items);
    }

    fn items(&mut self, items: Vec<(String, &TreeNode)>) {
        let nested = self.list_depth > 0;
        if nested {
            self.buf.ensure_line_start();
        } else {
            self.buf.block_break();
        }

        let indent = "  ".repeat(self.list_depth);
        for (marker, item) in items {
            self.list_depth += 1;
            let body = self.capture(|w| w.render_children(item));
            self.list_depth -= 1;
            self.buf.push_item(&indent, &marker, &body);
        }

        if !nested {
            self.buf.block_break();
        }
    }

    fn table(&mut self, node: &TreeNode) {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in table_rows(node) {
            let cells: Vec<String> = row_cells(row)
                .map(|cell| escape_cell(&single_line(&self.capture(|w| w.render_children(cell)))))
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        self.buf.block_break();
        for (index, mut cells) in rows.into_iter().enumerate() {
            cells.resize(columns, String::new());
            self.buf.push_raw(&format!("| {} |", cells.join(" | ")));
            self.buf.line_break();
            if index == 0 {
                let separator = vec!["---"; columns].join(" | ");
                self.buf.push_raw(&format!("| {separator} |"));
                self.buf.line_break();
            }
        }
        self.buf.block_break();
    }

    fn structured_macro(&mut self, node: &TreeNode, name: &str) {
        let rich_body = node.child("rich-text-body");
        match classify_macro(name) {
            MacroKind::Skip => {}
            MacroKind::Code => {
                if let Some(body) = node.child("plain-text-body") {
                    let language = node.macro_param("language");
                    self.fenced(&body.text_content(), language.as_deref());
                }
            }
            MacroKind::Panel(label) => {
                let body = rich_body
                    .map(|b| self.capture(|w| w.render_children(b)))
                    .unwrap_or_default();
                let body = body.trim();
                let quoted = match node.macro_param("title").map(|t| escape_inline(&t)) {
                    Some(title) if body.is_empty() => format!("**{label}:** {title}"),
                    Some(title) => format!("**{label}:** {title}\n\n{body}"),
                    None if body.is_empty() => return,
                    None => format!("**{label}:** {body}"),
                };
                self.buf.push_prefixed("> ", &quoted);
            }
            MacroKind::Expand => {
                self.buf.block_break();
                if let Some(title) = node.macro_param("title") {
                    self.buf.push_inline(&format!("**{}**", escape_inline(&title)));
                    self.buf.block_break();
                }
                if let Some(body) = rich_body {
                    self.render_children(body);
                }
                self.buf.block_break();
            }
            MacroKind::Status => {
                if let Some(title) = node.macro_param("title") {
                    self.push_text(&format!(" {title} "));
                }
            }
            MacroKind::Jira => {
                if let Some(key) = node.macro_param("key") {
                    self.push_text(&format!(" {key} "));
                }
            }
            MacroKind::Other => {
                if let Some(body) = rich_body {
                    self.block(body);
                } else if let Some(body) = node.child("plain-text-body") {
                    self.push_text(&body.text_content());
                }
            }
        }
    }

    fn adf_extension(&mut self, node: &TreeNode) {
        match adf_content(node) {
            Some(AdfContent::Fallback(fallback)) => self.block(fallback),
            Some(AdfContent::Node(adf)) => self.adf_node(adf),
            None => {}
        }
    }

    fn adf_node(&mut self, node: &TreeNode) {
        let items = adf_items(node);
        if !items.is_empty() {
            let entries = items
                .into_iter()
                .filter_map(|item| Some(("- ".to_owned(), item.child("adf-content")?)))
                .collect();
            self.items(entries);
            return;
        }
        for child in &node.children {
            match child.local_name().as_str() {
                "adf-content" => self.block(child),
                "adf-node" => self.adf_node(child),
                _ => {}
            }
        }
    }
}

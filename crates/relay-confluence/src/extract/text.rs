//! Plain-text extraction by walking the storage tree.
//!
//! Sections are split while walking: a heading at or above the target level
//! hands the accumulated text to the [`SectionBuilder`] and opens a new
//! section. Headings nested in captured content (table cells, list items,
//! panels) never split.

use super::buffer::TextBuffer;
use super::builder::SectionBuilder;
use super::cleanup::{VERBATIM_LINE, single_line};
use super::elements::{
    AdfContent, MacroKind, adf_content, adf_items, classify_macro, is_block, is_skipped,
    link_body, link_label, row_cells, table_rows, task_complete,
};
use super::{Section, SectionOptions};
use crate::storage::TreeNode;

/// Walk `root` and collect its sections.
pub(crate) fn extract(root: &TreeNode, options: &SectionOptions) -> Vec<Section> {
    let mut walker = TextWalker {
        builder: SectionBuilder::new(options),
        buf: TextBuffer::default(),
        list_depth: 0,
        capture_depth: 0,
    };
    walker.render_children(root);
    let rest = walker.buf.take();
    walker.builder.finish(&rest)
}

struct TextWalker<'a> {
    builder: SectionBuilder<'a>,
    buf: TextBuffer,
    list_depth: usize,
    capture_depth: usize,
}

impl TextWalker<'_> {
    fn render_children(&mut self, node: &TreeNode) {
        self.buf.push_inline(&node.text);
        for child in &node.children {
            self.render_node(child);
            self.buf.push_inline(&child.tail);
        }
    }

    /// Render `f` into a fresh buffer and return what it produced.
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
            "blockquote" => self.blockquote(node),
            "br" => self.buf.line_break(),
            "hr" => self.buf.block_break(),
            "ul" => self.list(node, false),
            "ol" => self.list(node, true),
            "ac:task-list" => self.task_list(node),
            "table" => self.table(node),
            "pre" => self.preformatted(&node.text_content()),
            "ac:link" => self.link(node),
            "ac:image" | "img" => {}
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
        if self.capture_depth == 0 && self.builder.starts_section(level) {
            let content = self.buf.take();
            self.builder.start_section(level, &title, &content);
        } else {
            self.buf.block_break();
            self.buf.push_inline(&title);
            self.buf.block_break();
        }
    }

    fn block(&mut self, node: &TreeNode) {
        self.buf.block_break();
        self.render_children(node);
        self.buf.block_break();
    }

    /// Quoted content is captured, so headings inside it stay text.
    fn blockquote(&mut self, node: &TreeNode) {
        let body = self.capture(|w| w.render_children(node));
        if body.trim().is_empty() {
            return;
        }
        self.buf.block_break();
        self.buf.push_raw(body.trim());
        self.buf.block_break();
    }

    /// Preformatted text is bracketed by verbatim markers so cleanup keeps
    /// its spacing.
    fn preformatted(&mut self, text: &str) {
        let text = text.trim_matches(['\n', '\r']);
        if text.trim().is_empty() {
            return;
        }
        self.buf.block_break();
        self.buf.push_raw(VERBATIM_LINE);
        self.buf.line_break();
        self.buf.push_raw(text);
        self.buf.line_break();
        self.buf.push_raw(VERBATIM_LINE);
        self.buf.block_break();
    }

    fn list(&mut self, node: &TreeNode, ordered: bool) {
        let start = node
            .attr("start")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1);
        let items = node.children_named("li").enumerate().map(|(i, item)| {
            let marker = if ordered {
                format!("{}. ", start + i)
            } else {
                "- ".to_owned()
            };
            (marker, item)
        });
        self.items(items.collect());
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
        self.buf.block_break();
        for row in table_rows(node) {
            let cells: Vec<String> = row_cells(row)
                .map(|cell| single_line(&self.capture(|w| w.render_children(cell))))
                .collect();
            if cells.iter().all(String::is_empty) {
                continue;
            }
            self.buf.push_raw(&cells.join(" | "));
            self.buf.line_break();
        }
        self.buf.block_break();
    }

    fn link(&mut self, node: &TreeNode) {
        if let Some(body) = link_body(node) {
            self.render_children(body);
        } else if let Some(label) = link_label(node) {
            self.buf.push_inline(&label);
        }
    }

    fn structured_macro(&mut self, node: &TreeNode, name: &str) {
        let rich_body = node.child("rich-text-body");
        match classify_macro(name) {
            MacroKind::Skip => {}
            MacroKind::Code => {
                if let Some(body) = node.child("plain-text-body") {
                    self.preformatted(&body.text_content());
                }
            }
            MacroKind::Panel(label) => {
                let body = rich_body
                    .map(|b| self.capture(|w| w.render_children(b)))
                    .unwrap_or_default();
                let title = node.macro_param("title");
                if body.trim().is_empty() && title.is_none() {
                    return;
                }
                self.buf.block_break();
                self.buf.push_raw(&format!("{label}: "));
                if let Some(title) = title {
                    self.buf.push_inline(&title);
                    self.buf.line_break();
                }
                self.buf.push_raw(body.trim());
                self.buf.block_break();
            }
            MacroKind::Expand => {
                self.buf.block_break();
                if let Some(title) = node.macro_param("title") {
                    self.buf.push_inline(&title);
                    self.buf.line_break();
                }
                if let Some(body) = rich_body {
                    self.render_children(body);
                }
                self.buf.block_break();
            }
            MacroKind::Status => {
                if let Some(title) = node.macro_param("title") {
                    self.buf.push_inline(&format!(" {title} "));
                }
            }
            MacroKind::Jira => {
                if let Some(key) = node.macro_param("key") {
                    self.buf.push_inline(&format!(" {key} "));
                }
            }
            MacroKind::Other => {
                if let Some(body) = rich_body {
                    self.block(body);
                } else if let Some(body) = node.child("plain-text-body") {
                    self.buf.push_inline(&body.text_content());
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storage::parse_storage;

    fn sections(html: &str, options: &SectionOptions) -> Vec<Section> {
        extract(&parse_storage(html).unwrap(), options)
    }

    fn single_content(html: &str) -> String {
        let options = SectionOptions::new();
        let mut all = sections(html, &options);
        assert_eq!(all.len(), 1, "expected one section: {all:?}");
        all.remove(0).content
    }

    #[test]
    fn test_sections_per_target_heading() {
        let html = "<h2>One</h2><p>first</p><h2>Two</h2><p>second</p><h2>Three</h2>";
        let result = sections(html, &SectionOptions::new());

        let titles: Vec<_> = result.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert_eq!(result[0].content, "first");
        assert_eq!(result[2].content, "");
        assert!(result.iter().all(|s| s.level == 2));
    }

    #[test]
    fn test_leading_content_adds_section() {
        let html = "<p>intro</p><h2>One</h2><p>a</p><h2>Two</h2><p>b</p>";
        let options = SectionOptions::new().with_page_title("Page");
        let result = sections(html, &options);

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].title, "Page");
        assert_eq!(result[0].level, 0);
        assert_eq!(result[0].content, "intro");
        assert_eq!(result[1].hierarchy, "Page -> One");
    }

    #[test]
    fn test_hierarchy_drops_siblings() {
        let html = "<h1>Guide</h1><p>g</p><h2>Install</h2><p>i</p><h3>Linux</h3><p>l</p>\
                    <h2>Usage</h2><p>u</p><h1>Appendix</h1><h2>Links</h2><p>x</p>";
        let options = SectionOptions::new().with_target_level(3);
        let result = sections(html, &options);

        let hierarchies: Vec<_> = result.iter().map(|s| s.hierarchy.as_str()).collect();
        assert_eq!(
            hierarchies,
            vec![
                "Guide",
                "Guide -> Install",
                "Guide -> Install -> Linux",
                "Guide -> Usage",
                "Appendix -> Links",
            ]
        );
    }

    #[test]
    fn test_deeper_headings_stay_in_content() {
        let html = "<h2>Setup</h2><p>a</p><h3>Details</h3><p>b</p>";
        let result = sections(html, &SectionOptions::new());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content, "a\n\nDetails\n\nb");
    }

    #[test]
    fn test_headings_inside_layout_split() {
        let html = "<ac:layout><ac:layout-section ac:type=\"two_equal\"><ac:layout-cell>\
                    <h2>Left</h2><p>l</p></ac:layout-cell><ac:layout-cell><h2>Right</h2><p>r</p>\
                    </ac:layout-cell></ac:layout-section></ac:layout>";
        let result = sections(html, &SectionOptions::new());

        let titles: Vec<_> = result.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Left", "Right"]);
        assert_eq!(result[1].content, "r");
    }

    #[test]
    fn test_inline_formatting_flattened() {
        assert_eq!(
            single_content("<p>Use <strong>bold</strong> and <em>em</em>\n  here.</p>"),
            "Use bold and em here."
        );
    }

    #[test]
    fn test_nested_lists() {
        let html = "<ul><li>one<ul><li>nested</li></ul></li><li><p>two</p></li></ul><ol><li>a</li><li>b</li></ol>";
        assert_eq!(
            single_content(html),
            "- one\n  - nested\n- two\n\n1. a\n2. b"
        );
    }

    #[test]
    fn test_task_list() {
        let html = "<ac:task-list><ac:task><ac:task-id>1</ac:task-id><ac:task-status>complete</ac:task-status>\
                    <ac:task-body>done item</ac:task-body></ac:task><ac:task><ac:task-id>2</ac:task-id>\
                    <ac:task-status>incomplete</ac:task-status><ac:task-body>open item</ac:task-body></ac:task></ac:task-list>";
        assert_eq!(single_content(html), "- [x] done item\n- [ ] open item");
    }

    #[test]
    fn test_table_rows() {
        let html = "<table><tbody><tr><th>Name</th><th>Value</th></tr><tr><td><p>a</p></td><td>1</td></tr></tbody></table>";
        assert_eq!(single_content(html), "Name | Value\na | 1");
    }

    #[test]
    fn test_code_macro_verbatim() {
        let html = "<p>Run:</p><ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">bash</ac:parameter>\
                    <ac:plain-text-body><![CDATA[cargo  build\n  --release]]></ac:plain-text-body></ac:structured-macro>";
        assert_eq!(single_content(html), "Run:\n\ncargo  build\n  --release");
    }

    #[test]
    fn test_pre_keeps_spacing() {
        let html = "<p>Example:</p><pre>let  x  =  1;\n\n\nfoo(a,   b)</pre><p>after   it</p>";
        assert_eq!(
            single_content(html),
            "Example:\n\nlet  x  =  1;\n\n\nfoo(a,   b)\n\nafter it"
        );
    }

    #[test]
    fn test_code_in_list_item() {
        let html = "<ul><li><ac:structured-macro ac:name=\"code\"><ac:plain-text-body>\
                    <![CDATA[make  all\n  -j4]]></ac:plain-text-body></ac:structured-macro></li></ul>";
        assert_eq!(single_content(html), "- make  all\n  -j4");
    }

    #[test]
    fn test_noformat_macro() {
        let html = "<ac:structured-macro ac:name=\"noformat\"><ac:plain-text-body>\
                    <![CDATA[col1    col2\nval1    val2]]></ac:plain-text-body></ac:structured-macro>";
        assert_eq!(single_content(html), "col1    col2\nval1    val2");
    }

    #[test]
    fn test_jira_macro() {
        let html = "<p>Tracked in<ac:structured-macro ac:name=\"jira\">\
                    <ac:parameter ac:name=\"key\">OPS-42</ac:parameter></ac:structured-macro>today.</p>";
        assert_eq!(single_content(html), "Tracked in OPS-42 today.");
    }

    #[test]
    fn test_expand_macro() {
        let html = "<p>Before</p><ac:structured-macro ac:name=\"expand\"><ac:parameter ac:name=\"title\">Details</ac:parameter>\
                    <ac:rich-text-body><p>Hidden text</p></ac:rich-text-body></ac:structured-macro>";
        assert_eq!(single_content(html), "Before\n\nDetails\n\nHidden text");
    }

    #[test]
    fn test_hr_and_br() {
        let html = "<p>line one<br/>line two</p><hr/><p>after</p>";
        assert_eq!(single_content(html), "line one\nline two\n\nafter");
    }

    #[test]
    fn test_heading_inside_blockquote_does_not_split() {
        let html = "<h2>Top</h2><blockquote><h2>Quoted</h2><p>q</p></blockquote><p>after</p>";
        let result = sections(html, &SectionOptions::new());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content, "Quoted\n\nq\n\nafter");
    }

    #[test]
    fn test_panel_macro() {
        let html = "<ac:structured-macro ac:name=\"warning\"><ac:rich-text-body><p>Back up first.</p></ac:rich-text-body></ac:structured-macro>";
        assert_eq!(single_content(html), "Warning: Back up first.");
    }

    #[test]
    fn test_skipped_macros_and_placeholders() {
        let html = "<ac:structured-macro ac:name=\"toc\"><ac:parameter ac:name=\"maxLevel\">3</ac:parameter></ac:structured-macro>\
                    <p>text<ac:placeholder>Type here</ac:placeholder></p>";
        assert_eq!(single_content(html), "text");
    }

    #[test]
    fn test_links() {
        let html = "<p>See <ac:link><ri:page ri:content-title=\"Home\" /></ac:link>, \
                    <ac:link><ri:page ri:content-title=\"X\" /><ac:plain-text-link-body><![CDATA[the docs]]></ac:plain-text-link-body></ac:link> \
                    and <a href=\"https://example.com\">site</a>.</p>";
        assert_eq!(single_content(html), "See Home, the docs and site.");
    }

    #[test]
    fn test_status_emoticon_time() {
        let html = "<p>State<ac:structured-macro ac:name=\"status\"><ac:parameter ac:name=\"title\">DONE</ac:parameter></ac:structured-macro>\
                    <ac:emoticon ac:name=\"tick\" ac:emoji-fallback=\"✅\" /> on <time datetime=\"2024-05-01\" /></p>";
        assert_eq!(single_content(html), "State DONE ✅ on 2024-05-01");
    }

    #[test]
    fn test_adf_prefers_fallback() {
        let html = "<ac:adf-extension><ac:adf-node type=\"decision-list\"><ac:adf-node type=\"decision-item\">\
                    <ac:adf-content>Node text</ac:adf-content></ac:adf-node></ac:adf-node>\
                    <ac:adf-fallback><div><p>Fallback text</p></div></ac:adf-fallback></ac:adf-extension>";
        assert_eq!(single_content(html), "Fallback text");
    }

    #[test]
    fn test_adf_decision_items_without_fallback() {
        let html = "<ac:adf-extension><ac:adf-node type=\"decision-list\">\
                    <ac:adf-attribute key=\"local-id\">abc</ac:adf-attribute>\
                    <ac:adf-node type=\"decision-item\"><ac:adf-attribute key=\"state\">DECIDED</ac:adf-attribute>\
                    <ac:adf-content>Ship it</ac:adf-content></ac:adf-node></ac:adf-node></ac:adf-extension>";
        assert_eq!(single_content(html), "- Ship it");
    }

    #[test]
    fn test_heading_inside_table_does_not_split() {
        let html = "<h2>Top</h2><table><tr><td><h2>Cell</h2></td></tr></table>";
        let result = sections(html, &SectionOptions::new());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content, "Cell");
    }

    #[test]
    fn test_empty_heading_ignored() {
        let html = "<h2>  </h2><p>text</p>";
        let result = sections(html, &SectionOptions::new());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Introduction");
    }
}

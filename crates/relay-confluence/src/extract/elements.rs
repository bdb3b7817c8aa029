//! Element classification shared by the extractors.

use crate::storage::TreeNode;

/// How a structured macro contributes to extracted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MacroKind {
    /// Preformatted body in `ac:plain-text-body`.
    Code,
    /// Admonition panel with a label.
    Panel(&'static str),
    /// Collapsible block with a `title` parameter.
    Expand,
    /// Inline lozenge rendered as its `title` parameter.
    Status,
    /// Issue reference rendered as its `key` parameter.
    Jira,
    /// Navigation or embedding macro with no page content.
    Skip,
    /// Anything else: rich body, else plain body.
    Other,
}

pub(crate) fn classify_macro(name: &str) -> MacroKind {
    match name.to_ascii_lowercase().as_str() {
        "code" | "noformat" => MacroKind::Code,
        "info" => MacroKind::Panel("Info"),
        "note" => MacroKind::Panel("Note"),
        "warning" => MacroKind::Panel("Warning"),
        "tip" => MacroKind::Panel("Tip"),
        "panel" => MacroKind::Panel("Panel"),
        "expand" => MacroKind::Expand,
        "status" => MacroKind::Status,
        "jira" => MacroKind::Jira,
        "anchor" | "toc" | "toc-zone" | "children" | "pagetree" | "recently-updated"
        | "attachments" | "gallery" | "include" | "excerpt-include" | "contentbylabel"
        | "livesearch" | "profile" | "viewfile" => MacroKind::Skip,
        _ => MacroKind::Other,
    }
}

/// Elements whose subtree never contributes text.
pub(crate) fn is_skipped(tag: &str) -> bool {
    matches!(
        tag,
        "ac:placeholder" | "ac:parameter" | "script" | "style" | "head" | "title" | "colgroup"
    )
}

/// Layout and block containers.
pub(crate) fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "center"
            | "dl"
            | "dt"
            | "dd"
            | "ac:layout"
            | "ac:layout-section"
            | "ac:layout-cell"
    )
}

/// Rows of a table, looking through `thead`/`tbody`/`tfoot`.
pub(crate) fn table_rows(table: &TreeNode) -> Vec<&TreeNode> {
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);
    rows
}

fn collect_rows<'a>(node: &'a TreeNode, rows: &mut Vec<&'a TreeNode>) {
    for child in &node.children {
        match child.local_name().as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            _ => {}
        }
    }
}

/// Cells of a table row.
pub(crate) fn row_cells(row: &TreeNode) -> impl Iterator<Item = &TreeNode> {
    row.children
        .iter()
        .filter(|c| matches!(c.local_name().as_str(), "td" | "th"))
}

/// Body element of an `ac:link`, if it has any text.
pub(crate) fn link_body(link: &TreeNode) -> Option<&TreeNode> {
    link.child("link-body")
        .or_else(|| link.child("plain-text-link-body"))
        .filter(|body| !body.text_content().trim().is_empty())
}

/// Fallback label of an `ac:link` derived from its resource identifier.
pub(crate) fn link_label(link: &TreeNode) -> Option<String> {
    let resource = link.children.iter().find(|c| c.tag.starts_with("ri:"));
    let label = resource.and_then(|r| match r.local_name().as_str() {
        "page" | "blog-post" => r.attr("content-title").map(str::to_owned),
        "attachment" => r.attr("filename").map(str::to_owned),
        "user" => r
            .attr("username")
            .or_else(|| r.attr("account-id"))
            .or_else(|| r.attr("userkey"))
            .map(|u| format!("@{u}")),
        "space" => r.attr("space-key").map(str::to_owned),
        "url" => r.attr("value").map(str::to_owned),
        _ => None,
    });
    label.or_else(|| link.attr("anchor").map(|a| format!("#{a}")))
}

/// External URL of an `ac:link` pointing at `ri:url`.
pub(crate) fn link_url(link: &TreeNode) -> Option<&str> {
    link.child("url").and_then(|u| u.attr("value"))
}

/// Whether an `ac:task` is marked complete.
pub(crate) fn task_complete(task: &TreeNode) -> bool {
    task.child("task-status")
        .is_some_and(|s| s.text_content().trim().eq_ignore_ascii_case("complete"))
}

/// Content node of an `ac:adf-extension`.
///
/// Prefers the HTML fallback Confluence ships next to the ADF node.
pub(crate) enum AdfContent<'a> {
    Fallback(&'a TreeNode),
    Node(&'a TreeNode),
}

pub(crate) fn adf_content(extension: &TreeNode) -> Option<AdfContent<'_>> {
    extension
        .child("adf-fallback")
        .map(AdfContent::Fallback)
        .or_else(|| extension.child("adf-node").map(AdfContent::Node))
}

/// Decision or task items of an ADF list node.
pub(crate) fn adf_items(node: &TreeNode) -> Vec<&TreeNode> {
    node.children_named("adf-node")
        .filter(|n| n.attr("type").is_some_and(|t| t.ends_with("-item")))
        .collect()
}

/// Language of a `pre` block from a `class="language-x"` on it or its `code` child.
pub(crate) fn pre_language(pre: &TreeNode) -> Option<String> {
    std::iter::once(pre)
        .chain(pre.child("code"))
        .filter_map(|n| n.attr("class"))
        .flat_map(str::split_whitespace)
        .find_map(|c| c.strip_prefix("language-").map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_macro() {
        assert_eq!(classify_macro("code"), MacroKind::Code);
        assert_eq!(classify_macro("WARNING"), MacroKind::Panel("Warning"));
        assert_eq!(classify_macro("toc"), MacroKind::Skip);
        assert_eq!(classify_macro("details"), MacroKind::Other);
    }

    #[test]
    fn test_link_label_page_and_user() {
        let page = TreeNode::new("ac:link")
            .with_children(vec![TreeNode::new("ri:page").with_attr("ri:content-title", "Home")]);
        assert_eq!(link_label(&page).as_deref(), Some("Home"));

        let user = TreeNode::new("ac:link")
            .with_children(vec![TreeNode::new("ri:user").with_attr("ri:account-id", "557058")]);
        assert_eq!(link_label(&user).as_deref(), Some("@557058"));
    }

    #[test]
    fn test_link_label_anchor_only() {
        let link = TreeNode::new("ac:link").with_attr("ac:anchor", "setup");
        assert_eq!(link_label(&link).as_deref(), Some("#setup"));
    }

    #[test]
    fn test_table_rows_through_sections() {
        let row = TreeNode::new("tr");
        let table = TreeNode::new("table").with_children(vec![
            TreeNode::new("colgroup"),
            TreeNode::new("thead").with_children(vec![row.clone()]),
            TreeNode::new("tbody").with_children(vec![row.clone(), row]),
        ]);
        assert_eq!(table_rows(&table).len(), 3);
    }

    #[test]
    fn test_task_complete() {
        let done = TreeNode::new("ac:task")
            .with_children(vec![TreeNode::new("ac:task-status").with_text("complete")]);
        let open = TreeNode::new("ac:task")
            .with_children(vec![TreeNode::new("ac:task-status").with_text("incomplete")]);
        assert!(task_complete(&done));
        assert!(!task_complete(&open));
    }

    #[test]
    fn test_pre_language() {
        let pre = TreeNode::new("pre")
            .with_children(vec![TreeNode::new("code").with_attr("class", "language-sql")]);
        assert_eq!(pre_language(&pre).as_deref(), Some("sql"));
        assert_eq!(pre_language(&TreeNode::new("pre")), None);
    }
}

//! Tree node representation for Confluence storage format.

use std::collections::HashMap;

/// Node in a parsed storage-format tree.
///
/// Text follows the `ElementTree` model: `text` is the content before the
/// first child, `tail` is the content after this element's end tag that
/// belongs to the parent.
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    /// Element tag name, including the namespace prefix (`ac:link`).
    pub tag: String,
    /// Direct text content.
    pub text: String,
    /// Text after element.
    pub tail: String,
    /// Element attributes keyed by their prefixed name.
    pub attrs: HashMap<String, String>,
    /// Child nodes.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new tree node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Add a single attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Tag name without namespace prefix, lowercased.
    #[must_use]
    pub fn local_name(&self) -> String {
        let name = self.tag.rsplit_once(':').map_or(self.tag.as_str(), |(_, n)| n);
        name.to_ascii_lowercase()
    }

    /// Whether the tag carries the Confluence `ac:` prefix.
    #[must_use]
    pub fn is_confluence(&self) -> bool {
        self.tag.starts_with("ac:")
    }

    /// Attribute lookup tolerant to `ac:`/`ri:` prefixes.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .or_else(|| self.attrs.get(&format!("ac:{name}")))
            .or_else(|| self.attrs.get(&format!("ri:{name}")))
            .map(String::as_str)
    }

    /// First direct child with the given local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a TreeNode> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// All text of this node and its descendants, without the node's own tail.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Macro name for `ac:structured-macro` (and legacy `ac:macro`) elements.
    #[must_use]
    pub fn macro_name(&self) -> Option<&str> {
        if !self.is_confluence() {
            return None;
        }
        match self.local_name().as_str() {
            "structured-macro" | "macro" => self.attr("name"),
            _ => None,
        }
    }

    /// Value of a named `ac:parameter` child of a macro.
    #[must_use]
    pub fn macro_param(&self, name: &str) -> Option<String> {
        self.children_named("parameter")
            .find(|p| p.attr("name") == Some(name))
            .map(|p| p.text_content().trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Heading level for `h1`..`h6`.
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        match self.local_name().as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }
}

//! Section accumulation shared by the text and markdown extractors.

use super::Section;
use super::SectionOptions;
use super::cleanup::clean_text;
use super::hierarchy::HeadingStack;

/// Title of the leading section when no page title is known.
pub(crate) const LEADING_TITLE: &str = "Introduction";

struct OpenSection {
    title: String,
    hierarchy: String,
    level: u8,
}

/// Collects sections as headings are encountered.
///
/// The caller owns the content buffer and hands over the finished content of
/// the open section whenever a new section starts.
pub(crate) struct SectionBuilder<'a> {
    options: &'a SectionOptions,
    stack: HeadingStack,
    open: OpenSection,
    sections: Vec<Section>,
}

impl<'a> SectionBuilder<'a> {
    pub(crate) fn new(options: &'a SectionOptions) -> Self {
        let root = options.page_title.as_deref().unwrap_or(LEADING_TITLE);
        Self {
            options,
            stack: HeadingStack::new(),
            open: OpenSection {
                title: root.to_owned(),
                hierarchy: root.to_owned(),
                level: 0,
            },
            sections: Vec::new(),
        }
    }

    /// Whether a heading of this level starts a new section.
    pub(crate) fn starts_section(&self, level: u8) -> bool {
        level <= self.options.target_level
    }

    /// Close the open section with `content` and open one for the heading.
    pub(crate) fn start_section(&mut self, level: u8, title: &str, content: &str) {
        self.close(content);
        self.stack.push(level, title);
        self.open = OpenSection {
            title: title.to_owned(),
            hierarchy: self.stack.hierarchy(self.options.page_title.as_deref()),
            level,
        };
    }

    /// Close the last section and return everything collected.
    pub(crate) fn finish(mut self, content: &str) -> Vec<Section> {
        self.close(content);
        self.sections
    }

    fn close(&mut self, content: &str) {
        let content = clean_text(content);
        // Target-level sections are always kept; leading content and
        // higher-level headings only when they carry text.
        if self.open.level != self.options.target_level && content.is_empty() {
            tracing::debug!("Skipping empty section '{}'", self.open.title);
            return;
        }
        self.sections.push(Section {
            title: std::mem::take(&mut self.open.title),
            hierarchy: std::mem::take(&mut self.open.hierarchy),
            level: self.open.level,
            content,
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_leading_content_uses_page_title() {
        let options = SectionOptions::new().with_page_title("Runbook");
        let mut builder = SectionBuilder::new(&options);
        builder.start_section(2, "Setup", "Overview text");
        let sections = builder.finish("Install it");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Runbook");
        assert_eq!(sections[0].hierarchy, "Runbook");
        assert_eq!(sections[0].level, 0);
        assert_eq!(sections[1].hierarchy, "Runbook -> Setup");
    }

    #[test]
    fn test_empty_leading_content_dropped() {
        let options = SectionOptions::new();
        let mut builder = SectionBuilder::new(&options);
        builder.start_section(2, "Setup", "  \n\n ");
        let sections = builder.finish("");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Setup");
        assert_eq!(sections[0].content, "");
    }

    #[test]
    fn test_empty_parent_heading_dropped() {
        let options = SectionOptions::new();
        let mut builder = SectionBuilder::new(&options);
        builder.start_section(1, "Guide", "");
        builder.start_section(2, "Setup", "");
        let sections = builder.finish("body");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].hierarchy, "Guide -> Setup");
    }

    #[test]
    fn test_starts_section() {
        let options = SectionOptions::new().with_target_level(3);
        let builder = SectionBuilder::new(&options);
        assert!(builder.starts_section(1));
        assert!(builder.starts_section(3));
        assert!(!builder.starts_section(4));
    }
}

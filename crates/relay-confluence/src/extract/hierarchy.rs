//! Heading stack tracking the ancestors of the current position.

/// Separator between hierarchy levels.
pub const HIERARCHY_SEPARATOR: &str = " -> ";

/// One heading on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub text: String,
}

/// Stack of open headings, outermost first.
///
/// Levels on the stack are strictly increasing.
#[derive(Debug, Default)]
pub struct HeadingStack {
    entries: Vec<HeadingEntry>,
}

impl HeadingStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a heading.
    ///
    /// Every entry at the same or a deeper level is closed first, so siblings
    /// and their descendants leave the hierarchy.
    pub fn push(&mut self, level: u8, text: impl Into<String>) {
        while self.entries.last().is_some_and(|e| e.level >= level) {
            self.entries.pop();
        }
        self.entries.push(HeadingEntry {
            level,
            text: text.into(),
        });
    }

    /// Open headings, outermost first.
    #[must_use]
    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    /// Ancestor path joined with `" -> "`, optionally under a root label.
    #[must_use]
    pub fn hierarchy(&self, root: Option<&str>) -> String {
        root.into_iter()
            .chain(self.entries.iter().map(|e| e.text.as_str()))
            .collect::<Vec<_>>()
            .join(HIERARCHY_SEPARATOR)
    }
}

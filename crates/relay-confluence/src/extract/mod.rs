//! Section extraction from storage-format bodies.
//!
//! A page body is restructured into [`Section`]s following its heading
//! hierarchy. Two renditions exist:
//!
//! - text mode ([`extract_sections`]) walks the storage tree directly and
//!   produces plain text
//! - markdown mode ([`extract_markdown_sections`]) converts the body to
//!   markdown with [`to_markdown`] and splits it with [`split_markdown`]
//!
//! Both apply the same heading rules: headings at or above the target level
//! start sections, deeper headings stay in the content.

mod buffer;
mod builder;
mod chunk;
mod cleanup;
mod elements;
pub mod hierarchy;
mod markdown;
mod text;

pub use chunk::chunk_sections;
pub use cleanup::clean_text;
pub use markdown::{split_markdown, to_markdown};
pub use relay_config::ExtractMode;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::storage::parse_storage;

/// Default heading level that starts a section.
pub const DEFAULT_TARGET_LEVEL: u8 = 2;

/// One section of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, page title for leading content.
    pub title: String,
    /// Ancestor headings joined with `" -> "`.
    pub hierarchy: String,
    /// Heading level, `0` for content before the first section heading.
    pub level: u8,
    /// Cleaned section content.
    pub content: String,
}

/// Options controlling how a body is split into sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOptions {
    /// Headings at or above this level start sections.
    pub target_level: u8,
    /// Page title used for the leading section and as hierarchy root.
    pub page_title: Option<String>,
    /// Chunk sections longer than this many characters.
    pub max_chunk_chars: Option<usize>,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            target_level: DEFAULT_TARGET_LEVEL,
            page_title: None,
            max_chunk_chars: None,
        }
    }
}

impl SectionOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_target_level(mut self, level: u8) -> Self {
        self.target_level = level;
        self
    }

    #[must_use]
    pub fn with_page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_max_chunk_chars(mut self, max_chars: usize) -> Self {
        self.max_chunk_chars = Some(max_chars);
        self
    }

    /// Check the target level is a valid heading level.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidTargetLevel`] outside `1..=6`.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if (1..=6).contains(&self.target_level) {
            Ok(())
        } else {
            Err(ExtractError::InvalidTargetLevel(self.target_level))
        }
    }

    fn chunk(&self, sections: Vec<Section>) -> Vec<Section> {
        match self.max_chunk_chars {
            Some(max_chars) => chunk_sections(sections, max_chars),
            None => sections,
        }
    }
}

/// Extract plain-text sections from a storage-format body.
///
/// # Errors
///
/// Returns an error if the options are invalid or the body cannot be parsed.
pub fn extract_sections(
    html: &str,
    options: &SectionOptions,
) -> Result<Vec<Section>, ExtractError> {
    options.validate()?;
    let root = parse_storage(html)?;
    let sections = text::extract(&root, options);
    tracing::debug!("Extracted {} text sections", sections.len());
    Ok(options.chunk(sections))
}

/// Extract markdown sections from a storage-format body.
///
/// # Errors
///
/// Returns an error if the options are invalid or the body cannot be parsed.
pub fn extract_markdown_sections(
    html: &str,
    options: &SectionOptions,
) -> Result<Vec<Section>, ExtractError> {
    options.validate()?;
    let markdown = to_markdown(html)?;
    let sections = split_markdown(&markdown, options);
    tracing::debug!("Extracted {} markdown sections", sections.len());
    Ok(options.chunk(sections))
}

/// Extract sections in the given mode.
///
/// # Errors
///
/// Returns an error if the options are invalid or the body cannot be parsed.
pub fn extract(
    html: &str,
    mode: ExtractMode,
    options: &SectionOptions,
) -> Result<Vec<Section>, ExtractError> {
    match mode {
        ExtractMode::Text => extract_sections(html, options),
        ExtractMode::Markdown => extract_markdown_sections(html, options),
    }
}

//! `relay confluence` commands.

mod file;
mod page;
mod search;

use std::path::Path;

use clap::{Args, Subcommand};
use relay_config::{CliSettings, ExtractConfig, ExtractMode};
use relay_confluence::SectionOptions;

pub(crate) use file::FileArgs;
pub(crate) use page::PageArgs;
pub(crate) use search::SearchArgs;

use crate::error::CliError;

/// Confluence extraction commands.
#[derive(Subcommand)]
pub(crate) enum ConfluenceCommand {
    /// Fetch a page and print its sections as JSON.
    Page(PageArgs),
    /// Extract sections from a local storage-format file.
    File(FileArgs),
    /// Search content with CQL and print the matching pages.
    Search(SearchArgs),
}

impl ConfluenceCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, the Confluence API or extraction fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        match self {
            Self::Page(args) => args.execute(config_path),
            Self::File(args) => args.execute(config_path),
            Self::Search(args) => args.execute(config_path),
        }
    }
}

/// Section extraction flags shared by the commands.
#[derive(Args, Debug, Default)]
pub(crate) struct ExtractArgs {
    /// Output flavor: text or markdown (overrides config).
    #[arg(short, long)]
    mode: Option<ExtractMode>,

    /// Deepest heading level that starts a section, 1-6 (overrides config).
    #[arg(short, long)]
    level: Option<u8>,

    /// Split sections longer than this many characters, 0 disables (overrides config).
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Page title used as the hierarchy root.
    #[arg(short, long)]
    title: Option<String>,
}

impl ExtractArgs {
    /// Settings that override the loaded configuration.
    fn cli_settings(&self, base_url: Option<String>) -> CliSettings {
        CliSettings {
            base_url,
            target_level: self.level,
            mode: self.mode,
            max_chunk_chars: self.max_chunk_chars,
        }
    }

    /// Section options from the resolved configuration.
    fn section_options(&self, extract: &ExtractConfig) -> SectionOptions {
        let mut options = SectionOptions::new().with_target_level(extract.target_level);
        if let Some(max_chars) = extract.max_chunk_chars {
            options = options.with_max_chunk_chars(max_chars);
        }
        if let Some(title) = &self.title {
            options = options.with_page_title(title.clone());
        }
        options
    }
}

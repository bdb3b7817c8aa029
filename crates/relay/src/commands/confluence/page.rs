//! `relay confluence page` command implementation.

use std::path::Path;

use clap::Args;
use relay_config::Config;
use relay_confluence::ConfluenceClient;
use relay_confluence::node::PageContent;

use super::ExtractArgs;
use crate::error::CliError;
use crate::output::{Output, print_json};

/// Arguments for the confluence page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Confluence page ID.
    page_id: String,

    /// Also extract the page's direct children.
    #[arg(long)]
    pub(super) children: bool,

    /// Maximum number of child pages.
    #[arg(long, default_value_t = 25)]
    limit: usize,

    /// Confluence base URL (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    #[command(flatten)]
    pub(super) extract: ExtractArgs,
}

impl PageArgs {
    /// Execute the page command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or extracted.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let settings = self.extract.cli_settings(self.base_url.clone());
        let config = Config::load(config_path, Some(&settings))?;
        let client = ConfluenceClient::from_config(config.require_confluence()?)?;
        let options = self.extract.section_options(&config.extract);
        let mode = config.extract.mode;

        let page = client.get_page(&self.page_id)?;
        let content = PageContent::extract(&client, page, mode, &options)?;
        output.success(&format!(
            "Extracted {} sections from \"{}\"",
            content.sections.len(),
            content.title
        ));
        output.detail(&content.url);

        if !self.children {
            return print_json(&content);
        }

        let mut contents = vec![content];
        for child in client.child_pages(&self.page_id, self.limit)? {
            let child = PageContent::extract(&client, child, mode, &options)?;
            output.info(&format!(
                "  {} sections from \"{}\"",
                child.sections.len(),
                child.title
            ));
            contents.push(child);
        }
        print_json(&contents)
    }
}

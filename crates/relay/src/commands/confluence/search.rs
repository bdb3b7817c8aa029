//! `relay confluence search` command implementation.

use std::path::Path;

use clap::Args;
use relay_config::{CliSettings, Config};
use relay_confluence::ConfluenceClient;
use relay_confluence::node::PageRef;

use crate::error::CliError;
use crate::output::{Output, print_json};

/// Arguments for the confluence search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// CQL query, e.g. `space = OPS AND type = page`.
    cql: String,

    /// Maximum number of results.
    #[arg(long, default_value_t = 25)]
    limit: usize,

    /// Confluence base URL (overrides config).
    #[arg(long)]
    base_url: Option<String>,
}

impl SearchArgs {
    /// Execute the search command.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        if self.cql.trim().is_empty() {
            return Err(CliError::Validation("CQL query cannot be empty".to_owned()));
        }

        let settings = CliSettings {
            base_url: self.base_url,
            ..Default::default()
        };
        let config = Config::load(config_path, Some(&settings))?;
        let client = ConfluenceClient::from_config(config.require_confluence()?)?;

        let pages = client.search(&self.cql, self.limit)?;
        if pages.is_empty() {
            output.info("No pages found");
        } else {
            output.success(&format!("Found {} pages", pages.len()));
        }

        let refs: Vec<PageRef> = pages
            .iter()
            .map(|page| PageRef::from_page(&client, page))
            .collect();
        print_json(&refs)
    }
}

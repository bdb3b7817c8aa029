//! Confluence flow nodes.

use relay_config::ExtractMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{ConfluenceNode, StoreTarget};
use crate::client::ConfluenceClient;
use crate::error::{ConfluenceError, NodeError};
use crate::extract::{DEFAULT_TARGET_LEVEL, Section, SectionOptions, extract};
use crate::types::Page;

/// Default number of search results.
const DEFAULT_SEARCH_LIMIT: usize = 25;

fn default_target_level() -> u8 {
    DEFAULT_TARGET_LEVEL
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

/// Page content stored by [`GetPageContentNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContent {
    pub id: String,
    pub title: String,
    pub url: String,
    pub sections: Vec<Section>,
}

impl PageContent {
    /// Extract the sections of a fetched page.
    ///
    /// The page title becomes the hierarchy root unless `options` already
    /// name one.
    ///
    /// # Errors
    ///
    /// Returns an error if the page has no storage body or extraction fails.
    pub fn extract(
        client: &ConfluenceClient,
        page: Page,
        mode: ExtractMode,
        options: &SectionOptions,
    ) -> Result<Self, NodeError> {
        let body = page
            .storage_body()
            .ok_or_else(|| ConfluenceError::MissingBody(page.id.clone()))?;

        let mut options = options.clone();
        if options.page_title.is_none() {
            options.page_title = Some(page.title.clone());
        }
        let sections = extract(body, mode, &options)?;
        info!(
            "Extracted {} sections from page {}",
            sections.len(),
            page.id
        );

        Ok(Self {
            url: client.page_url(&page),
            id: page.id,
            title: page.title,
            sections,
        })
    }
}

/// Search hit stored by [`SearchContentNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl PageRef {
    /// Reference to `page` with its web URL resolved against `client`.
    #[must_use]
    pub fn from_page(client: &ConfluenceClient, page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            url: client.page_url(page),
        }
    }
}

/// Fetch a page and store its sections.
#[derive(Debug, Clone, Deserialize)]
pub struct GetPageContentNode {
    pub page_id: String,
    #[serde(default)]
    pub mode: ExtractMode,
    #[serde(default = "default_target_level")]
    pub target_level: u8,
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
    pub output: StoreTarget,
}

impl GetPageContentNode {
    fn options(&self) -> SectionOptions {
        let options = SectionOptions::new().with_target_level(self.target_level);
        match self.max_chunk_chars {
            Some(max_chars) => options.with_max_chunk_chars(max_chars),
            None => options,
        }
    }
}

impl ConfluenceNode for GetPageContentNode {
    fn output(&self) -> &StoreTarget {
        &self.output
    }

    fn run(&self, client: &ConfluenceClient) -> Result<Option<Value>, NodeError> {
        let page_id = self.page_id.trim();
        if page_id.is_empty() {
            return Err(NodeError::Config("page_id is required".to_owned()));
        }

        let page = match client.get_page(page_id) {
            Ok(page) => page,
            Err(ConfluenceError::HttpResponse { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content = PageContent::extract(client, page, self.mode, &self.options())?;
        Ok(Some(serde_json::to_value(content)?))
    }
}

/// Run a CQL search and store the matching pages.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchContentNode {
    pub cql: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    pub output: StoreTarget,
}

impl ConfluenceNode for SearchContentNode {
    fn output(&self) -> &StoreTarget {
        &self.output
    }

    fn run(&self, client: &ConfluenceClient) -> Result<Option<Value>, NodeError> {
        let cql = self.cql.trim();
        if cql.is_empty() {
            return Err(NodeError::Config("cql is required".to_owned()));
        }

        let pages = client.search(cql, self.limit)?;
        if pages.is_empty() {
            return Ok(None);
        }

        let refs: Vec<PageRef> = pages
            .iter()
            .map(|page| PageRef::from_page(client, page))
            .collect();
        Ok(Some(serde_json::to_value(refs)?))
    }
}

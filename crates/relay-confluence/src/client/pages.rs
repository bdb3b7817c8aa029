//! Page operations for Confluence API.

use relay_config::ApiVersion;
use tracing::info;

use super::{ConfluenceClient, encode_component};
use crate::error::ConfluenceError;
use crate::types::{Page, PageList};

/// Expansions requested for v1 content so the storage body comes back.
const V1_EXPAND: &str = "body.storage,version";

impl ConfluenceClient {
    /// Get a page with its storage body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with an
    /// error status or the response is not a page.
    pub fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let id = encode_component(page_id);
        let url = match self.api_version {
            ApiVersion::V1 => format!("{}/content/{id}?expand={V1_EXPAND}", self.api_url()),
            ApiVersion::V2 => format!("{}/pages/{id}?body-format=storage", self.api_v2_url()),
        };

        info!("Getting page {}", page_id);
        let page: Page = self.get_json(&url)?;
        info!("Got page {} '{}'", page.id, page.title);
        Ok(page)
    }

    /// List child pages of a page, storage bodies included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an
    /// error status.
    pub fn child_pages(&self, page_id: &str, limit: usize) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/page?limit={limit}&expand={V1_EXPAND}",
            self.api_url(),
            encode_component(page_id)
        );

        info!("Getting child pages of {}", page_id);
        let list: PageList = self.get_json(&url)?;
        info!("Found {} child pages of {}", list.size, page_id);
        Ok(list.results)
    }

    /// Web URL of a page.
    #[must_use]
    pub fn page_url(&self, page: &Page) -> String {
        match page.webui() {
            Some(webui) => format!("{}{}", self.base_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }
}

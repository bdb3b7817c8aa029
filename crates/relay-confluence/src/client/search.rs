//! CQL search.

use tracing::info;

use super::{ConfluenceClient, encode_component};
use crate::error::ConfluenceError;
use crate::types::{Page, PageList};

impl ConfluenceClient {
    /// Search content with a CQL query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an
    /// error status (Confluence rejects malformed CQL with `400`).
    pub fn search(&self, cql: &str, limit: usize) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!(
            "{}/content/search?cql={}&limit={limit}&expand=body.storage,version",
            self.api_url(),
            encode_component(cql)
        );

        info!("Searching content: {}", cql);
        let list: PageList = self.get_json(&url)?;
        info!("Search returned {} results", list.size);
        Ok(list.results)
    }
}

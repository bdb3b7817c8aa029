//! Confluence page types.
//!
//! The v1 `/rest/api/content` and v2 `/api/v2/pages` endpoints both return
//! `id`, `title`, `version`, `body.storage` and `_links` when the storage body
//! is requested, so one type covers both.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type (`page`, `blogpost`); absent in v2 responses.
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    /// Page title.
    pub title: String,
    /// Version information.
    #[serde(default)]
    pub version: Option<Version>,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Storage-format body, if the response carried one.
    #[must_use]
    pub fn storage_body(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }

    /// Version number, if the response carried one.
    #[must_use]
    pub fn version_number(&self) -> Option<u32> {
        self.version.as_ref().map(|v| v.number)
    }

    /// Web UI path relative to the base URL.
    #[must_use]
    pub fn webui(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.webui.as_deref())
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    #[serde(default)]
    pub representation: Option<String>,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Paged list of content (`content/search`, `child/page`).
#[derive(Debug, Clone, Deserialize)]
pub struct PageList {
    /// Pages in this batch.
    #[serde(default)]
    pub results: Vec<Page>,
    /// Number of results in this batch.
    #[serde(default)]
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserialize_v1_page() {
        let page: Page = serde_json::from_value(serde_json::json!({
            "id": "123",
            "type": "page",
            "title": "Runbook",
            "version": {"number": 7},
            "body": {"storage": {"value": "<p>x</p>", "representation": "storage"}},
            "_links": {"webui": "/spaces/OPS/pages/123/Runbook", "self": "https://x"}
        }))
        .unwrap();

        assert_eq!(page.content_type.as_deref(), Some("page"));
        assert_eq!(page.storage_body(), Some("<p>x</p>"));
        assert_eq!(page.version_number(), Some(7));
        assert_eq!(page.webui(), Some("/spaces/OPS/pages/123/Runbook"));
    }

    #[test]
    fn test_deserialize_v2_page() {
        let page: Page = serde_json::from_value(serde_json::json!({
            "id": "123",
            "status": "current",
            "title": "Runbook",
            "spaceId": "98",
            "version": {"number": 2, "createdAt": "2024-01-01T00:00:00Z"},
            "body": {"storage": {"value": "<p>y</p>", "representation": "storage"}}
        }))
        .unwrap();

        assert_eq!(page.content_type, None);
        assert_eq!(page.storage_body(), Some("<p>y</p>"));
        assert_eq!(page.webui(), None);
    }

    #[test]
    fn test_page_without_body() {
        let page: Page =
            serde_json::from_value(serde_json::json!({"id": "1", "title": "T"})).unwrap();
        assert_eq!(page.storage_body(), None);
        assert_eq!(page.version_number(), None);
    }
}

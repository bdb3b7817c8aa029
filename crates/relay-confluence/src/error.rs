//! Error types for Confluence integration.

use std::str::Utf8Error;

/// Error while parsing a storage-format body.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error")]
    Utf8(#[from] Utf8Error),

    /// XML attribute error.
    #[error("XML attribute error")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Error while extracting sections from a page body.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Target heading level outside `1..=6`.
    #[error("target heading level must be between 1 and 6, got {0}")]
    InvalidTargetLevel(u8),

    /// Body could not be parsed.
    #[error("storage format error: {0}")]
    Storage(#[from] StorageError),
}

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Page has no storage body in the response.
    #[error("page {0} has no storage body")]
    MissingBody(String),

    /// Client configuration error.
    #[error("{0}")]
    Config(String),
}

/// Error raised inside an extension node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Missing or invalid node configuration.
    #[error("{0}")]
    Config(String),

    /// Confluence API error.
    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    /// Section extraction error.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Result could not be converted to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

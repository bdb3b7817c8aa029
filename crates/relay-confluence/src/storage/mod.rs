//! Confluence storage format.
//!
//! Storage format is the XHTML page body Confluence stores and returns from
//! `body.storage`. Besides plain XHTML it carries Confluence elements in the
//! `ac:` and `ri:` namespaces (`ac:structured-macro`, `ac:task-list`,
//! `ac:adf-extension`, `ri:page`, ...). This module parses it into a
//! [`TreeNode`] tree the extractors walk.

mod entities;
mod parser;
mod tree;

pub use entities::{convert_html_entities, decode_entities};
pub use tree::TreeNode;

use crate::error::StorageError;

/// Parse a storage-format body into a tree.
///
/// The returned node is a synthetic `root` element whose children are the
/// top-level elements of the body.
///
/// # Errors
///
/// Returns an error if the body is not well-formed XML after entity conversion.
pub fn parse_storage(html: &str) -> Result<TreeNode, StorageError> {
    tracing::debug!("Parsing storage body ({} bytes)", html.len());
    parser::parse(html)
}

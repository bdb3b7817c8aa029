//! Confluence content extraction for relay.
//!
//! This crate turns Confluence pages into heading-aware sections for
//! retrieval pipelines:
//! - [`storage`]: storage-format XHTML parsed into a [`TreeNode`](storage::TreeNode) tree
//! - [`extract`]: sections in plain text or markdown, with size-bounded chunking
//! - [`ConfluenceClient`]: REST API client with basic or bearer authentication
//! - [`node`]: flow nodes that fetch, extract and store results
//!
//! # Extraction
//!
//! ```ignore
//! use relay_confluence::extract::{SectionOptions, extract_sections};
//!
//! let options = SectionOptions::new().with_page_title("Runbook");
//! let sections = extract_sections("<h2>Setup</h2><p>Install it.</p>", &options)?;
//! assert_eq!(sections[0].hierarchy, "Runbook -> Setup");
//! ```
//!
//! # API Client
//!
//! ```ignore
//! use relay_confluence::ConfluenceClient;
//!
//! let client = ConfluenceClient::from_config(&config)?;
//! let page = client.get_page("123")?;
//! println!("Page title: {}", page.title);
//! ```

// Storage format parsing
pub mod storage;

// Section extraction
pub mod extract;
pub use extract::{ExtractMode, Section, SectionOptions};

// API client
mod client;
pub use client::{Auth, ConfluenceClient};

// Types
pub mod types;
pub use types::Page;

// Flow nodes
pub mod node;

// Errors
pub mod error;
pub use error::{ConfluenceError, ExtractError, NodeError, StorageError};

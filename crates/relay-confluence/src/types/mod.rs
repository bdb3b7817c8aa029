//! Confluence API types.

mod page;

pub use page::{Body, Links, Page, PageList, Storage, Version};

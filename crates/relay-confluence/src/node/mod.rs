//! Flow node execution.
//!
//! A node validates its configuration, calls Confluence, stores the result in
//! the host's input or context store and reports which child route the flow
//! continues on:
//!
//! | outcome    | stored value          | route        |
//! |------------|-----------------------|--------------|
//! | `Success`  | node result           | `onSuccess`  |
//! | `NotFound` | nothing               | `onNotFound` |
//! | `Error`    | `{"error": message}`  | `onError`    |

mod confluence;
mod store;

pub use confluence::{GetPageContentNode, PageContent, PageRef, SearchContentNode};
pub use store::{FlowStore, MemoryStore, StoreLocation, StoreTarget};

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::client::ConfluenceClient;
use crate::error::NodeError;

/// Result of running a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    Success,
    NotFound,
    Error,
}

impl NodeOutcome {
    /// Name of the child route the flow continues on.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Success => "onSuccess",
            Self::NotFound => "onNotFound",
            Self::Error => "onError",
        }
    }
}

/// Run `f` and store its result at `output`.
///
/// `Ok(None)` means the requested content does not exist.
pub fn execute<S, F>(store: &mut S, output: &StoreTarget, f: F) -> NodeOutcome
where
    S: FlowStore + ?Sized,
    F: FnOnce() -> Result<Option<Value>, NodeError>,
{
    match f() {
        Ok(Some(value)) => {
            store.set(output.location, &output.key, value);
            NodeOutcome::Success
        }
        Ok(None) => {
            debug!("Nothing found for '{}'", output.key);
            NodeOutcome::NotFound
        }
        Err(e) => {
            warn!("Node failed: {}", e);
            store.set(output.location, &output.key, json!({"error": e.to_string()}));
            NodeOutcome::Error
        }
    }
}

/// A Confluence-backed flow node.
pub trait ConfluenceNode {
    /// Where the result is stored.
    fn output(&self) -> &StoreTarget;

    /// Compute the node result.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the Confluence call
    /// fails.
    fn run(&self, client: &ConfluenceClient) -> Result<Option<Value>, NodeError>;

    /// Run the node and store its result.
    fn execute(&self, client: &ConfluenceClient, store: &mut dyn FlowStore) -> NodeOutcome {
        execute(store, self.output(), || self.run(client))
    }
}

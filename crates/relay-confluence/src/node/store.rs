//! Flow stores nodes write their results into.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Which host store receives a node result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreLocation {
    /// Per-conversation input store.
    Input,
    /// Flow context store.
    #[default]
    Context,
}

/// Location and key a node writes to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreTarget {
    #[serde(default)]
    pub location: StoreLocation,
    pub key: String,
}

impl StoreTarget {
    pub fn new(location: StoreLocation, key: impl Into<String>) -> Self {
        Self {
            location,
            key: key.into(),
        }
    }
}

/// Key-value stores provided by the host flow.
pub trait FlowStore {
    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, location: StoreLocation, key: &str, value: Value);

    /// Value stored under `key`.
    fn get(&self, location: StoreLocation, key: &str) -> Option<&Value>;
}

/// In-memory [`FlowStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    input: HashMap<String, Value>,
    context: HashMap<String, Value>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, location: StoreLocation) -> &HashMap<String, Value> {
        match location {
            StoreLocation::Input => &self.input,
            StoreLocation::Context => &self.context,
        }
    }
}

impl FlowStore for MemoryStore {
    fn set(&mut self, location: StoreLocation, key: &str, value: Value) {
        let map = match location {
            StoreLocation::Input => &mut self.input,
            StoreLocation::Context => &mut self.context,
        };
        map.insert(key.to_owned(), value);
    }

    fn get(&self, location: StoreLocation, key: &str) -> Option<&Value> {
        self.map(location).get(key)
    }
}

//! The external hierarchical key-value store, at its interface.
//!
//! Paths are `/`-separated (`"campaigns/abc123"`). Every operation is
//! independently failable; writes are last-write-wins per key and there is
//! no multi-key transaction -- the backing service offers none, and the
//! repositories are written against that contract.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Error type shared by tree and blob operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing service rejected or failed an operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A record did not (de)serialize as the expected shape.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// An edit was attempted without a known previous record.
    #[error("missing edit target: {0}")]
    MissingTarget(&'static str),
}

/// One notification from a subscription: the full value at the subscribed
/// path as of the change.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    /// The subscribed path.
    pub path: String,
    /// Value at the path; `None` when the path is absent.
    pub value: Option<Value>,
    /// Child entries in query order when the value is an object, empty
    /// otherwise.
    pub entries: Vec<(String, Value)>,
}

/// Asynchronous client for the hierarchical key-value tree.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Read the value at `path`. Absent paths yield `None`.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`. `null` children are pruned on write.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Shallow-merge `partial` into the object at `path`, creating it if
    /// absent. A `null` entry deletes that child.
    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the value at `path`. Removing an absent path is a no-op.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Watch `path`: the current snapshot is delivered immediately, then a
    /// fresh snapshot after every change under the path. `order_key`
    /// orders object children by that child field.
    async fn subscribe(
        &self,
        path: &str,
        order_key: Option<&str>,
    ) -> Result<mpsc::Receiver<TreeSnapshot>, StoreError>;
}

/// Order an object's children for query results.
///
/// With an `order_key`, children sort by that field (numbers numerically,
/// strings lexicographically, absent values first); without one, by child
/// key.
pub fn order_entries(object: &Map<String, Value>, order_key: Option<&str>) -> Vec<(String, Value)> {
    let mut entries: Vec<(String, Value)> = object
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    match order_key {
        Some(order_key) => {
            entries.sort_by(|(_, a), (_, b)| compare_child(a.get(order_key), b.get(order_key)));
        }
        None => entries.sort_by(|(a, _), (b, _)| a.cmp(b)),
    }
    entries
}

fn compare_child(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

//! In-memory tree + blob backend.
//!
//! Used by tests and local development. Mirrors the behavioural contract
//! of the hosted service: last-write-wins per key, `null` pruning on
//! `set`, `null`-deletes on `update`, no-op removes of absent paths, and
//! subscription fan-out that delivers the current snapshot first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};

use crate::blob::{BlobStore, PhotoUpload};
use crate::tree::{order_entries, StoreError, TreeSnapshot, TreeStore};

/// Buffer for the change-notification channel. Subscribers that lag drop
/// stale notifications and pick up the next fresh snapshot.
const EVENT_CAPACITY: usize = 1024;

/// Buffer for each subscriber's snapshot queue.
const SNAPSHOT_CAPACITY: usize = 16;

/// Shared in-process store implementing both [`TreeStore`] and
/// [`BlobStore`]. Cheaply cloneable; clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    tree: RwLock<Value>,
    blobs: Mutex<HashMap<String, PhotoUpload>>,
    changes: broadcast::Sender<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                tree: RwLock::new(Value::Object(Map::new())),
                blobs: Mutex::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Raw blob contents, for tests.
    pub fn blob_contents(&self, path: &str) -> Option<Vec<u8>> {
        self.inner
            .blobs
            .lock()
            .ok()?
            .get(path)
            .map(|photo| photo.bytes.clone())
    }

    fn read_at(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self
            .inner
            .tree
            .read()
            .map_err(|_| StoreError::Backend("tree lock poisoned".into()))?;
        Ok(lookup(&root, path).cloned())
    }

    fn snapshot(&self, path: &str, order_key: Option<&str>) -> Result<TreeSnapshot, StoreError> {
        let value = self.read_at(path)?;
        let entries = match &value {
            Some(Value::Object(map)) => order_entries(map, order_key),
            _ => Vec::new(),
        };
        Ok(TreeSnapshot {
            path: path.to_string(),
            value,
            entries,
        })
    }

    fn notify(&self, path: &str) {
        // Zero receivers is fine; the error only means nobody is watching.
        let _ = self.inner.changes.send(path.to_string());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.read_at(path)
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let pruned = prune_nulls(value);
        // Nulls and empty objects are the same as no value at all.
        let is_empty_object = matches!(&pruned, Value::Object(map) if map.is_empty());
        let stored = if pruned.is_null() || is_empty_object {
            None
        } else {
            Some(pruned)
        };
        {
            let mut root = self
                .inner
                .tree
                .write()
                .map_err(|_| StoreError::Backend("tree lock poisoned".into()))?;
            write(&mut root, &segments(path), stored);
        }
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), StoreError> {
        {
            let mut root = self
                .inner
                .tree
                .write()
                .map_err(|_| StoreError::Backend("tree lock poisoned".into()))?;
            for (key, value) in partial {
                let child_path = format!("{}/{key}", path.trim_matches('/'));
                let stored = match value {
                    Value::Null => None,
                    other => Some(prune_nulls(other)),
                };
                write(&mut root, &segments(&child_path), stored);
            }
        }
        self.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        {
            let mut root = self
                .inner
                .tree
                .write()
                .map_err(|_| StoreError::Backend("tree lock poisoned".into()))?;
            write(&mut root, &segments(path), None);
        }
        self.notify(path);
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &str,
        order_key: Option<&str>,
    ) -> Result<mpsc::Receiver<TreeSnapshot>, StoreError> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CAPACITY);

        // Current state first, like the service's value listeners.
        let initial = self.snapshot(path, order_key)?;
        tx.send(initial)
            .await
            .map_err(|_| StoreError::Backend("subscriber dropped before first snapshot".into()))?;

        let store = self.clone();
        let path = path.trim_matches('/').to_string();
        let order_key = order_key.map(str::to_string);
        let mut changes = self.inner.changes.subscribe();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(changed) => {
                        if !paths_overlap(&changed, &path) {
                            continue;
                        }
                        let snapshot = match store.snapshot(&path, order_key.as_deref()) {
                            Ok(snapshot) => snapshot,
                            Err(_) => break,
                        };
                        if tx.send(snapshot).await.is_err() {
                            break; // subscriber went away
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(rx)
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, path: &str, photo: &PhotoUpload) -> Result<String, StoreError> {
        self.inner
            .blobs
            .lock()
            .map_err(|_| StoreError::Backend("blob lock poisoned".into()))?
            .insert(path.to_string(), photo.clone());
        Ok(format!("memory://{path}"))
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.inner
            .blobs
            .lock()
            .map_err(|_| StoreError::Backend("blob lock poisoned".into()))?
            .remove(path);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tree plumbing
// ---------------------------------------------------------------------------

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Write (`Some`) or delete (`None`) the value at a segment path, creating
/// intermediate objects on the way down and pruning ones left empty.
fn write(node: &mut Value, segs: &[&str], value: Option<Value>) {
    match segs {
        [] => {
            *node = value.unwrap_or(Value::Object(Map::new()));
        }
        [last] => {
            let map = ensure_object(node);
            match value {
                Some(value) => {
                    map.insert((*last).to_string(), value);
                }
                None => {
                    map.remove(*last);
                }
            }
        }
        [first, rest @ ..] => {
            let map = ensure_object(node);
            let child = map
                .entry((*first).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            write(child, rest, value);
            if child.as_object().is_some_and(|m| m.is_empty()) {
                map.remove(*first);
            }
        }
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

/// Remove `null` entries recursively; the service never stores nulls.
fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, child)| !child.is_null())
                .map(|(key, child)| (key, prune_nulls(child)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

/// Whether a change at `a` is visible from a subscription at `b` (either
/// path is a segment-prefix of the other).
fn paths_overlap(a: &str, b: &str) -> bool {
    let a = segments(a);
    let b = segments(b);
    let shared = a.len().min(b.len());
    a[..shared] == b[..shared]
}

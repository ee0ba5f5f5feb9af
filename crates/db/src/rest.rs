//! REST backends for the tree and blob interfaces.
//!
//! [`RestTree`] speaks the realtime database's REST dialect: the value at
//! `{path}` is exposed at `GET/PUT/PATCH/DELETE {base}/{path}.json`, with
//! an optional `auth` query parameter. Change streaming is approximated by
//! polling, which is sufficient for the admin surface this service runs.
//!
//! [`RestBlobs`] is a client for a plain HTTP object endpoint: `PUT`
//! stores the body under the path, `DELETE` removes it, and objects are
//! publicly readable under a separate base URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::blob::{BlobStore, PhotoUpload};
use crate::tree::{order_entries, StoreError, TreeSnapshot, TreeStore};

/// Default interval between subscription polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Buffer for each subscriber's snapshot queue.
const SNAPSHOT_CAPACITY: usize = 16;

pub struct RestTree {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    poll_interval: Duration,
}

impl RestTree {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth_token,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_matches('/');
        match &self.auth_token {
            Some(token) => format!("{base}/{path}.json?auth={token}"),
            None => format!("{base}/{path}.json"),
        }
    }

    async fn fetch(client: &reqwest::Client, url: &str) -> Result<Option<Value>, StoreError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(backend)?
            .error_for_status()
            .map_err(backend)?;
        let value: Value = response.json().await.map_err(backend)?;
        Ok(non_null(value))
    }
}

#[async_trait]
impl TreeStore for RestTree {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Self::fetch(&self.client, &self.url(path)).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.client
            .put(self.url(path))
            .json(&value)
            .send()
            .await
            .map_err(backend)?
            .error_for_status()
            .map_err(backend)?;
        Ok(())
    }

    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), StoreError> {
        self.client
            .patch(self.url(path))
            .json(&Value::Object(partial))
            .send()
            .await
            .map_err(backend)?
            .error_for_status()
            .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .map_err(backend)?
            .error_for_status()
            .map_err(backend)?;
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &str,
        order_key: Option<&str>,
    ) -> Result<mpsc::Receiver<TreeSnapshot>, StoreError> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CAPACITY);
        let client = self.client.clone();
        let url = self.url(path);
        let path = path.trim_matches('/').to_string();
        let order_key = order_key.map(str::to_string);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut last: Option<Option<Value>> = None;
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                let value = match Self::fetch(&client, &url).await {
                    Ok(value) => value,
                    Err(err) => {
                        tracing::warn!(path = %path, error = %err, "subscription poll failed");
                        continue;
                    }
                };
                if last.as_ref() == Some(&value) {
                    continue;
                }
                last = Some(value.clone());
                let entries = match &value {
                    Some(Value::Object(map)) => order_entries(map, order_key.as_deref()),
                    _ => Vec::new(),
                };
                let snapshot = TreeSnapshot {
                    path: path.clone(),
                    value,
                    entries,
                };
                if tx.send(snapshot).await.is_err() {
                    break; // subscriber went away
                }
            }
        });

        Ok(rx)
    }
}

pub struct RestBlobs {
    client: reqwest::Client,
    base_url: String,
    public_url: String,
}

impl RestBlobs {
    /// `base_url` receives the writes; `public_url` is what download URLs
    /// are minted from (the two differ behind a CDN).
    pub fn new(base_url: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            public_url: public_url.into(),
        }
    }

    fn object_url(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_matches('/'))
    }
}

#[async_trait]
impl BlobStore for RestBlobs {
    async fn put(&self, path: &str, photo: &PhotoUpload) -> Result<String, StoreError> {
        self.client
            .put(Self::object_url(&self.base_url, path))
            .header(CONTENT_TYPE, &photo.content_type)
            .body(photo.bytes.clone())
            .send()
            .await
            .map_err(backend)?
            .error_for_status()
            .map_err(backend)?;
        Ok(Self::object_url(&self.public_url, path))
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(Self::object_url(&self.base_url, path))
            .send()
            .await
            .map_err(backend)?;
        // Deleting something already gone is a no-op, not a failure.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status().map_err(backend)?;
        Ok(())
    }
}

fn backend(err: reqwest::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

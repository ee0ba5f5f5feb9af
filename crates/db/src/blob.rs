//! The external blob store, at its interface.

use async_trait::async_trait;

use crate::tree::StoreError;

/// An uploaded photo: raw bytes plus the content type the client declared.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Asynchronous client for the blob store backing product and campaign
/// photos. Blobs share the record keyspace: the photo for
/// `campaigns/{id}` lives at the blob path `campaigns/{id}`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `photo` under `path` and return a retrievable URL.
    ///
    /// Overwriting an existing path keeps the URL stable, which is what
    /// lets edits replace a photo without rewriting the record.
    async fn put(&self, path: &str, photo: &PhotoUpload) -> Result<String, StoreError>;

    /// Delete the blob at `path`. Removing an absent blob is a no-op.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;
}

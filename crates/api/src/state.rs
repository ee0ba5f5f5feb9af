use std::sync::Arc;

use quitanda_db::{BlobStore, TreeStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the stores are shared trait objects).
#[derive(Clone)]
pub struct AppState {
    /// Client for the external realtime tree.
    pub tree: Arc<dyn TreeStore>,
    /// Client for the external blob store.
    pub blobs: Arc<dyn BlobStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
}

use crate::auth::jwt::JwtConfig;

/// Which tree/blob backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store; state lives and dies with the server. For local
    /// development and tests.
    Memory,
    /// REST clients for the hosted realtime tree and blob endpoint.
    Rest,
}

/// Connection settings for the external stores.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Base URL of the realtime tree's REST interface (`rest` backend).
    pub tree_base_url: Option<String>,
    /// Optional `auth` query token for tree requests.
    pub tree_auth_token: Option<String>,
    /// Seconds between subscription polls against the tree.
    pub tree_poll_secs: u64,
    /// Base URL blob writes go to (`rest` backend).
    pub blob_base_url: Option<String>,
    /// Base URL download links are minted from. Defaults to the write URL.
    pub blob_public_url: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// External store connection settings.
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3001`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORE_BACKEND`        | `memory`                   |
    /// | `STORE_BASE_URL`       | -- (required for `rest`)   |
    /// | `STORE_AUTH_TOKEN`     | --                         |
    /// | `STORE_POLL_SECS`      | `5`                        |
    /// | `BLOB_BASE_URL`        | -- (required for `rest`)   |
    /// | `BLOB_PUBLIC_URL`      | `BLOB_BASE_URL`            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".into())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "rest" => StoreBackend::Rest,
            other => panic!("Unknown STORE_BACKEND '{other}'. Must be 'memory' or 'rest'"),
        };

        let tree_poll_secs: u64 = std::env::var("STORE_POLL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("STORE_POLL_SECS must be a valid u64");

        let store = StoreConfig {
            backend,
            tree_base_url: std::env::var("STORE_BASE_URL").ok(),
            tree_auth_token: std::env::var("STORE_AUTH_TOKEN").ok(),
            tree_poll_secs,
            blob_base_url: std::env::var("BLOB_BASE_URL").ok(),
            blob_public_url: std::env::var("BLOB_PUBLIC_URL").ok(),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            store,
        }
    }
}

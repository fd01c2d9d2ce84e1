//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum upload body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10 MiB, matches the multipart file cap
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Asset store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage, served under `public_base_url`.
    Filesystem {
        /// Root directory for stored assets.
        path: PathBuf,
        /// Base URL under which assets are publicly reachable
        /// (e.g., "http://localhost:8000/uploads").
        #[serde(default = "default_public_base_url")]
        public_base_url: String,
    },
    /// Remote content-addressed asset store reachable over HTTPS.
    Remote {
        /// Store API endpoint (e.g., "https://assets.example.com").
        endpoint: String,
        /// API key for authenticated operations.
        /// WARNING: Prefer the BACKROOM_STORAGE__API_KEY env var over
        /// storing secrets in config files.
        api_key: Option<String>,
    },
}

fn default_public_base_url() -> String {
    "http://localhost:8000/uploads".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/assets"),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/backroom.db"),
        }
    }
}

/// Authentication configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign admin JWTs.
    /// WARNING: Prefer the BACKROOM_AUTH__JWT_SECRET env var over storing
    /// secrets in config files.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 3600 // 7 days
}

impl AuthConfig {
    /// Create a test configuration with a dummy signing secret.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            jwt_secret: "test-jwt-secret".to_string(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }

    /// Get the token lifetime as a Duration.
    pub fn token_ttl(&self) -> Duration {
        let secs = i64::try_from(self.token_ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs)
    }
}

/// Optional first-admin bootstrap account.
///
/// When set and no admin account exists yet, one is created at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    /// Display name (defaults to "Admin").
    pub name: Option<String>,
    /// Login email.
    pub email: String,
    /// Initial password.
    /// WARNING: Prefer the BACKROOM_BOOTSTRAP_ADMIN__PASSWORD env var over
    /// storing secrets in config files.
    pub password: String,
}

/// Duplicate-upload cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadCacheConfig {
    /// Entry time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Background sweep interval in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    300 // 5 minutes
}

impl Default for UploadCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl UploadCacheConfig {
    /// Get the entry TTL as a std Duration.
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_secs)
    }

    /// Get the sweep interval as a std Duration.
    ///
    /// A zero interval would make `tokio::time::interval` panic, so it is
    /// clamped to one second.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Asset store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Authentication configuration (required).
    pub auth: AuthConfig,
    /// Duplicate-upload cache configuration.
    #[serde(default)]
    pub upload_cache: UploadCacheConfig,
    /// First-admin bootstrap account (optional).
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage, SQLite metadata,
    /// and a dummy JWT secret.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            metadata: MetadataConfig::default(),
            auth: AuthConfig::for_testing(),
            upload_cache: UploadCacheConfig::default(),
            bootstrap_admin: None,
        }
    }
}

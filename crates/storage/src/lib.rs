//! Asset storage abstraction and backends for backroom.
//!
//! This crate provides:
//! - Content-addressed image storage keyed by content hash
//! - Best-effort batch deletion with per-URL fault isolation
//! - Backends: local filesystem and a remote HTTPS asset store

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, remote::RemoteBackend};
pub use error::{StorageError, StorageResult};
pub use traits::{AssetMetadata, AssetStore, BatchDelete, FailedDelete};

use backroom_core::config::StorageConfig;
use std::sync::Arc;

/// Create an asset store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn AssetStore>> {
    match config {
        StorageConfig::Filesystem {
            path,
            public_base_url,
        } => {
            let backend = FilesystemBackend::new(path, public_base_url.clone()).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Remote { endpoint, api_key } => {
            let backend = RemoteBackend::new(endpoint.clone(), api_key.clone())?;
            Ok(Arc::new(backend))
        }
    }
}

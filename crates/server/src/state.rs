//! Application state shared across handlers.

use crate::mailer::Mailer;
use crate::upload_cache::UploadCache;
use backroom_core::config::AppConfig;
use backroom_metadata::MetadataStore;
use backroom_storage::AssetStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Asset store backend.
    pub storage: Arc<dyn AssetStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Duplicate-upload cache.
    pub upload_cache: Arc<UploadCache>,
    /// Outbound email collaborator.
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn AssetStore>,
        metadata: Arc<dyn MetadataStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let upload_cache = Arc::new(UploadCache::new(config.upload_cache.ttl()));
        Self {
            config: Arc::new(config),
            storage,
            metadata,
            upload_cache,
            mailer,
        }
    }

    /// Spawn the upload cache sweeper for this state.
    ///
    /// Returns the task handle; the caller keeps it for the life of the
    /// process.
    pub fn spawn_cache_sweeper(&self) -> tokio::task::JoinHandle<()> {
        self.upload_cache
            .clone()
            .spawn_sweeper(self.config.upload_cache.sweep_interval())
    }
}

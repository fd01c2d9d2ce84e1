//! Asset store trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use backroom_core::{ImagePayload, TransformOptions};
use serde::Serialize;

/// Metadata about a stored asset.
#[derive(Clone, Debug, Serialize)]
pub struct AssetMetadata {
    /// Publicly reachable URL of the asset.
    pub url: String,
    /// Key of the object within the store.
    pub storage_key: String,
    /// Image format (e.g. "jpg").
    pub format: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

/// A single URL that could not be deleted.
#[derive(Clone, Debug, Serialize)]
pub struct FailedDelete {
    pub url: String,
    pub reason: String,
}

/// Aggregate outcome of a batch deletion.
///
/// Batch deletion is best-effort: this type is always returned, never
/// thrown, and callers decide whether a non-empty `failed` set matters.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchDelete {
    /// URLs whose assets were removed (or already absent).
    pub deleted: Vec<String>,
    /// URLs that could not be processed, with the reason.
    pub failed: Vec<FailedDelete>,
}

impl BatchDelete {
    /// Whether every URL was processed cleanly.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Content-addressed asset store abstraction.
///
/// Storage keys are derived from content hashes, so uploads of identical
/// bytes resolve to the same object and overwriting is safe.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    /// Check whether an asset exists, returning its metadata when present.
    async fn exists(&self, key: &str) -> StorageResult<Option<AssetMetadata>>;

    /// Upload an image payload under the given key.
    ///
    /// Transform options are forwarded to the store. Transport or quota
    /// failures surface as [`crate::StorageError::Upload`].
    async fn upload(
        &self,
        payload: &ImagePayload,
        key: &str,
        transform: &TransformOptions,
    ) -> StorageResult<AssetMetadata>;

    /// Delete an asset.
    ///
    /// Returns `true` when an object was removed and `false` when nothing
    /// existed under the key; "not found" is a successful no-op, never an
    /// error.
    async fn destroy(&self, key: &str) -> StorageResult<bool>;

    /// Recover the storage key from a previously returned asset URL.
    ///
    /// Returns `None` for URLs that do not match this store's URL shape.
    /// Must not fail: unparsable URLs are an anticipated input.
    fn extract_storage_key(&self, url: &str) -> Option<String>;

    /// Get the name of this storage backend ("remote", "filesystem").
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Delete the assets behind a set of URLs, best-effort.
    ///
    /// Each URL is resolved with [`AssetStore::extract_storage_key`] and
    /// destroyed independently; one failure never aborts the remaining
    /// URLs. The aggregate outcome is returned, never an error.
    async fn delete_batch(&self, urls: &[String]) -> BatchDelete {
        let mut outcome = BatchDelete::default();
        for url in urls {
            let Some(key) = self.extract_storage_key(url) else {
                tracing::warn!(url = %url, "could not extract storage key from URL");
                outcome.failed.push(FailedDelete {
                    url: url.clone(),
                    reason: "could not extract storage key from URL".to_string(),
                });
                continue;
            };
            match self.destroy(&key).await {
                Ok(deleted) => {
                    if !deleted {
                        tracing::debug!(key = %key, "asset already absent during batch delete");
                    }
                    outcome.deleted.push(url.clone());
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to delete asset");
                    outcome.failed.push(FailedDelete {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcome
    }
}

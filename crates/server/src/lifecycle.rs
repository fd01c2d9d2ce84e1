//! Product image lifecycle.
//!
//! The persisted image list is replaced wholesale on every update. URLs
//! present in the old list but absent from the new one lose their backing
//! asset as a side effect; that cleanup is best-effort and never blocks
//! the primary write. Failing to add an image loses caller intent, so
//! create-path upload errors stay fatal; failing to remove an orphaned
//! asset only wastes storage.

use crate::metrics::CLEANUP_FAILURES;
use backroom_core::ImageRecord;
use backroom_storage::{AssetStore, BatchDelete};
use std::collections::HashSet;

/// URLs present in `old` but absent from `new` (set difference by URL).
pub fn removed_urls(old: &[ImageRecord], new: &[ImageRecord]) -> Vec<String> {
    let kept: HashSet<&str> = new.iter().map(|img| img.url.as_str()).collect();
    old.iter()
        .filter(|img| !kept.contains(img.url.as_str()))
        .map(|img| img.url.clone())
        .collect()
}

/// Delete the assets behind the given URLs, best-effort.
///
/// The aggregate outcome is returned for response metadata; failures are
/// logged and counted but never propagate.
pub async fn cleanup_images(store: &dyn AssetStore, urls: &[String]) -> BatchDelete {
    if urls.is_empty() {
        return BatchDelete::default();
    }

    let outcome = store.delete_batch(urls).await;
    if !outcome.is_clean() {
        CLEANUP_FAILURES.inc_by(outcome.failed.len() as u64);
        tracing::warn!(
            deleted = outcome.deleted.len(),
            failed = outcome.failed.len(),
            "image cleanup completed with failures"
        );
    } else {
        tracing::debug!(deleted = outcome.deleted.len(), "image cleanup completed");
    }
    outcome
}

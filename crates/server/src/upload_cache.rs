//! Duplicate-upload suppression cache.
//!
//! A short-lived, in-process map from content hash to the most recent
//! upload result. It exists to absorb the common case of a client
//! re-submitting identical bytes within one interaction (double form
//! submission); the asset store's existence check remains the
//! authoritative dedup guard. Entries die with the process.

use backroom_core::{ContentHash, UploadResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A cached upload result with its insertion time.
struct CacheEntry {
    result: UploadResult,
    inserted_at: Instant,
}

/// In-process duplicate-upload cache.
///
/// Owned by [`crate::state::AppState`] and injected where needed, so
/// tests construct isolated instances and drive the clock explicitly
/// through the `*_at` methods.
pub struct UploadCache {
    entries: Mutex<HashMap<ContentHash, CacheEntry>>,
    ttl: Duration,
}

impl UploadCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a fresh entry for the given content hash.
    pub async fn get(&self, hash: &ContentHash) -> Option<UploadResult> {
        self.get_at(hash, Instant::now()).await
    }

    /// Clock-explicit lookup; expired entries are treated as absent.
    pub async fn get_at(&self, hash: &ContentHash, now: Instant) -> Option<UploadResult> {
        let entries = self.entries.lock().await;
        let entry = entries.get(hash)?;
        if now.duration_since(entry.inserted_at) < self.ttl {
            Some(entry.result.clone())
        } else {
            None
        }
    }

    /// Record an upload result for the given content hash.
    pub async fn put(&self, hash: ContentHash, result: UploadResult) {
        self.put_at(hash, result, Instant::now()).await;
    }

    /// Clock-explicit insert.
    pub async fn put_at(&self, hash: ContentHash, result: UploadResult, now: Instant) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            hash,
            CacheEntry {
                result,
                inserted_at: now,
            },
        );
    }

    /// Evict entries older than the TTL. Returns the number evicted.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    /// Clock-explicit sweep.
    pub async fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        before - entries.len()
    }

    /// Number of live entries, including any not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache currently holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Spawn the periodic sweep task.
    ///
    /// Returns the task handle; the caller keeps it alive for the life of
    /// the process. Sweeping is housekeeping only — `get_at` already
    /// refuses stale entries, so a delayed sweep is never a correctness
    /// problem.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.sweep().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "swept expired upload cache entries");
                }
            }
        })
    }
}

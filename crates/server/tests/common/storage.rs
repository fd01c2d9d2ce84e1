//! Storage test utilities.

use async_trait::async_trait;
use backroom_core::{ImagePayload, TransformOptions};
use backroom_storage::{AssetMetadata, AssetStore, FilesystemBackend, StorageResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An asset store that counts calls and records destroyed keys.
///
/// Wraps a filesystem backend so behavior stays real; the counters let
/// tests assert how often the store was actually hit.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
pub struct CountingStore {
    inner: FilesystemBackend,
    pub uploads: AtomicUsize,
    pub exists_checks: AtomicUsize,
    pub destroys: AtomicUsize,
    destroyed_keys: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl CountingStore {
    pub async fn new(root: &std::path::Path, public_base_url: &str) -> StorageResult<Self> {
        Ok(Self {
            inner: FilesystemBackend::new(root, public_base_url).await?,
            uploads: AtomicUsize::new(0),
            exists_checks: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
            destroyed_keys: Mutex::new(Vec::new()),
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn destroyed_keys(&self) -> Vec<String> {
        self.destroyed_keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for CountingStore {
    async fn exists(&self, key: &str) -> StorageResult<Option<AssetMetadata>> {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key).await
    }

    async fn upload(
        &self,
        payload: &ImagePayload,
        key: &str,
        transform: &TransformOptions,
    ) -> StorageResult<AssetMetadata> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload(payload, key, transform).await
    }

    async fn destroy(&self, key: &str) -> StorageResult<bool> {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        self.destroyed_keys.lock().unwrap().push(key.to_string());
        self.inner.destroy(key).await
    }

    fn extract_storage_key(&self, url: &str) -> Option<String> {
        self.inner.extract_storage_key(url)
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

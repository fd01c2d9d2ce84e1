//! Local filesystem asset store backend.
//!
//! Used for development and tests. Assets are written under a root
//! directory and served by the HTTP layer under a public base URL; a
//! JSON sidecar per object carries the metadata a remote store would
//! report. No transforms are applied and pixel data is never inspected,
//! so reported dimensions are zero.

use crate::error::{StorageError, StorageResult};
use crate::traits::{AssetMetadata, AssetStore};
use async_trait::async_trait;
use backroom_core::{ImagePayload, TransformOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// Sidecar metadata persisted next to each stored object.
#[derive(Debug, Serialize, Deserialize)]
struct SidecarMeta {
    format: String,
    size_bytes: u64,
}

/// Local filesystem asset store.
pub struct FilesystemBackend {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemBackend {
    /// Create a new filesystem backend rooted at `root`.
    pub async fn new(root: impl AsRef<Path>, public_base_url: impl Into<String>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Validate a key and resolve it under the root.
    ///
    /// Keys are relative paths with normal components only; anything that
    /// could escape the storage root is rejected.
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(format!(
                "path traversal not allowed: {key}"
            )));
        }
        for component in Path::new(key).components() {
            match component {
                std::path::Component::Normal(_) => {}
                _ => {
                    return Err(StorageError::InvalidKey(format!(
                        "contains unsafe path component: {key}"
                    )));
                }
            }
        }
        Ok(self.root.join(key))
    }

    fn sidecar_path(&self, key: &str) -> StorageResult<PathBuf> {
        Ok(self.key_path(key)?.with_extension("meta.json"))
    }

    /// Path of the stored object itself, which carries the format
    /// extension so the public URL maps directly onto the file.
    fn object_path(&self, key: &str, format: &str) -> StorageResult<PathBuf> {
        Ok(self.key_path(key)?.with_extension(format))
    }

    fn public_url(&self, key: &str, format: &str) -> String {
        format!("{}/{key}.{format}", self.public_base_url)
    }

    async fn read_sidecar(&self, key: &str) -> StorageResult<Option<SidecarMeta>> {
        let path = self.sidecar_path(key)?;
        match fs::read(&path).await {
            Ok(data) => {
                let meta = serde_json::from_slice(&data).map_err(|e| {
                    StorageError::Remote(format!("corrupt sidecar metadata for {key}: {e}"))
                })?;
                Ok(Some(meta))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AssetStore for FilesystemBackend {
    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> StorageResult<Option<AssetMetadata>> {
        let Some(meta) = self.read_sidecar(key).await? else {
            return Ok(None);
        };
        Ok(Some(AssetMetadata {
            url: self.public_url(key, &meta.format),
            storage_key: key.to_string(),
            format: meta.format,
            size_bytes: meta.size_bytes,
            width: 0,
            height: 0,
        }))
    }

    #[instrument(skip(self, payload, _transform))]
    async fn upload(
        &self,
        payload: &ImagePayload,
        key: &str,
        _transform: &TransformOptions,
    ) -> StorageResult<AssetMetadata> {
        let data = payload.decode()?;
        let format = payload.declared_format().unwrap_or("jpg").to_string();

        let path = self.object_path(key, &format)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write through a temp file then rename so readers never observe
        // a partially written object.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &data)
            .await
            .map_err(|e| StorageError::Upload {
                reason: e.to_string(),
            })?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::Upload {
                reason: e.to_string(),
            })?;

        let meta = SidecarMeta {
            format: format.clone(),
            size_bytes: data.len() as u64,
        };
        let sidecar = self.sidecar_path(key)?;
        fs::write(
            &sidecar,
            serde_json::to_vec(&meta).map_err(|e| StorageError::Upload {
                reason: e.to_string(),
            })?,
        )
        .await
        .map_err(|e| StorageError::Upload {
            reason: e.to_string(),
        })?;

        tracing::debug!(key = %key, size_bytes = meta.size_bytes, "stored asset on filesystem");

        Ok(AssetMetadata {
            url: self.public_url(key, &format),
            storage_key: key.to_string(),
            format,
            size_bytes: data.len() as u64,
            width: 0,
            height: 0,
        })
    }

    #[instrument(skip(self))]
    async fn destroy(&self, key: &str) -> StorageResult<bool> {
        // The sidecar names the format, which names the object file.
        let Some(meta) = self.read_sidecar(key).await? else {
            return Ok(false);
        };
        let path = self.object_path(key, &meta.format)?;
        let sidecar = self.sidecar_path(key)?;

        let existed = match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        match fs::remove_file(&sidecar).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(existed)
    }

    fn extract_storage_key(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.public_base_url)?;
        let rest = rest.strip_prefix('/')?;
        let key = match rest.rfind('.') {
            Some(dot) => &rest[..dot],
            None => rest,
        };
        if key.is_empty() { None } else { Some(key.to_string()) }
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

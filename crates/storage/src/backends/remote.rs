//! Remote content-addressed asset store backend.
//!
//! Speaks HTTPS to an external object store. The store derives public
//! URLs that embed a version segment and the object path
//! (`https://<host>/assets/v<version>/<key>.<format>`), which
//! [`AssetStore::extract_storage_key`] parses back into the key.

use crate::error::{StorageError, StorageResult};
use crate::traits::{AssetMetadata, AssetStore};
use async_trait::async_trait;
use backroom_core::{ImagePayload, TransformOptions};
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Path marker preceding the version segment in asset URLs.
const URL_VERSION_MARKER: &str = "/assets/v";

/// Asset record as reported by the remote store.
#[derive(Debug, Deserialize)]
struct RemoteAsset {
    url: String,
    key: String,
    format: String,
    bytes: u64,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

impl RemoteAsset {
    fn into_metadata(self) -> AssetMetadata {
        AssetMetadata {
            url: self.url,
            storage_key: self.key,
            format: self.format,
            size_bytes: self.bytes,
            width: self.width,
            height: self.height,
        }
    }
}

/// Upload request body sent to the remote store.
#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    key: &'a str,
    /// Base64-encoded image bytes.
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    transform: &'a TransformOptions,
    /// Identical content maps to an identical key, so replacing the
    /// existing object is always safe.
    overwrite: bool,
}

/// Deletion response from the remote store.
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    deleted: bool,
}

/// Remote asset store client.
pub struct RemoteBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteBackend {
    /// Create a new remote backend for the given endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> StorageResult<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(StorageError::Config(
                "remote storage requires a non-empty endpoint".to_string(),
            ));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        })
    }

    fn asset_url(&self, key: &str) -> String {
        format!("{}/api/assets/{key}", self.endpoint)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl AssetStore for RemoteBackend {
    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> StorageResult<Option<AssetMetadata>> {
        let response = self
            .authorize(self.http.get(self.asset_url(key)))
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let asset: RemoteAsset = response
                    .json()
                    .await
                    .map_err(|e| StorageError::Remote(format!("invalid asset response: {e}")))?;
                Ok(Some(asset.into_metadata()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StorageError::Remote(format!(
                    "existence check failed ({status}): {body}"
                )))
            }
        }
    }

    #[instrument(skip(self, payload, transform))]
    async fn upload(
        &self,
        payload: &ImagePayload,
        key: &str,
        transform: &TransformOptions,
    ) -> StorageResult<AssetMetadata> {
        let data = payload.decode()?;
        let body = UploadRequest {
            key,
            data: base64::engine::general_purpose::STANDARD.encode(&data),
            format: payload.declared_format(),
            transform,
            overwrite: true,
        };

        let response = self
            .authorize(self.http.post(format!("{}/api/assets", self.endpoint)))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload {
                reason: format!("store rejected upload ({status}): {body}"),
            });
        }

        let asset: RemoteAsset = response.json().await.map_err(|e| StorageError::Upload {
            reason: format!("invalid upload response: {e}"),
        })?;

        tracing::debug!(key = %key, size_bytes = asset.bytes, "uploaded asset to remote store");
        Ok(asset.into_metadata())
    }

    #[instrument(skip(self))]
    async fn destroy(&self, key: &str) -> StorageResult<bool> {
        let response = self
            .authorize(self.http.delete(self.asset_url(key)))
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        match response.status() {
            // Not found is a successful no-op.
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => {
                let body: DestroyResponse = response
                    .json()
                    .await
                    .map_err(|e| StorageError::Remote(format!("invalid destroy response: {e}")))?;
                Ok(body.deleted)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StorageError::Remote(format!(
                    "destroy failed ({status}): {body}"
                )))
            }
        }
    }

    fn extract_storage_key(&self, url: &str) -> Option<String> {
        extract_key_from_url(url)
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}

/// Parse `.../assets/v<version>/<key>.<format>` back into `<key>`.
fn extract_key_from_url(url: &str) -> Option<String> {
    let marker = url.find(URL_VERSION_MARKER)?;
    let rest = &url[marker + URL_VERSION_MARKER.len()..];

    let slash = rest.find('/')?;
    let version = &rest[..slash];
    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let path = &rest[slash + 1..];
    let key = match path.rfind('.') {
        Some(dot) => &path[..dot],
        None => path,
    };
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_key_from_versioned_url() {
        assert_eq!(
            extract_key_from_url("https://assets.example.com/assets/v1712/products/abcdef.jpg"),
            Some("products/abcdef".to_string())
        );
        // Extensionless URLs still resolve.
        assert_eq!(
            extract_key_from_url("https://assets.example.com/assets/v3/products/abcdef"),
            Some("products/abcdef".to_string())
        );
    }

    #[test]
    fn returns_none_for_foreign_urls() {
        assert_eq!(extract_key_from_url("not-a-store-url"), None);
        assert_eq!(extract_key_from_url("https://other.example.com/x.jpg"), None);
        // Version segment must be numeric.
        assert_eq!(
            extract_key_from_url("https://assets.example.com/assets/vNaN/products/a.jpg"),
            None
        );
        // Empty key after the version segment.
        assert_eq!(
            extract_key_from_url("https://assets.example.com/assets/v1/.jpg"),
            None
        );
    }

    #[test]
    fn rejects_empty_endpoint() {
        match RemoteBackend::new("", None) {
            Err(StorageError::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }
}

//! Upload result types and storage key derivation.

use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};

/// Namespace prefix for product image storage keys.
pub const STORAGE_KEY_PREFIX: &str = "products";

/// Derive the deterministic storage key for image content.
///
/// The key embeds the content hash, so re-uploading identical bytes
/// resolves to the same remote object and the upload is idempotent.
pub fn storage_key_for(hash: &ContentHash) -> String {
    format!("{STORAGE_KEY_PREFIX}/{}", hash.to_hex())
}

/// The outcome of a successful image upload.
///
/// Produced once per store operation and immutable afterwards; the
/// duplicate-upload cache holds these keyed by `content_hash`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResult {
    /// Publicly reachable asset URL.
    pub url: String,
    /// Deterministic key of the object in the asset store.
    #[serde(rename = "storageKey")]
    pub storage_key: String,
    /// Hex-encoded content hash of the uploaded bytes.
    #[serde(rename = "contentHash")]
    pub content_hash: String,
    /// Image format as reported by the store (e.g. "jpg").
    pub format: String,
    /// Stored size in bytes.
    #[serde(rename = "sizeBytes")]
    pub size_bytes: u64,
    /// Pixel width as reported by the store.
    pub width: u32,
    /// Pixel height as reported by the store.
    pub height: u32,
    /// Whether this result was served without a fresh store upload.
    #[serde(rename = "isDuplicate")]
    pub is_duplicate: bool,
}

impl UploadResult {
    /// Return a copy marked as a duplicate.
    pub fn as_duplicate(&self) -> Self {
        Self {
            is_duplicate: true,
            ..self.clone()
        }
    }
}

/// Transformation options forwarded to the asset store on upload.
///
/// The store applies these server-side; this process never decodes
/// image pixels itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransformOptions {
    /// Bounding-box width in pixels.
    pub width: u32,
    /// Bounding-box height in pixels.
    pub height: u32,
    /// Fit mode ("limit" shrinks to fit without upscaling).
    pub crop: String,
    /// Quality setting ("auto" lets the store pick).
    pub quality: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            crop: "limit".to_string(),
            quality: "auto".to_string(),
        }
    }
}

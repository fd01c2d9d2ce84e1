//! Content hashing for uploaded images.
//!
//! Images arrive either as raw bytes (multipart file uploads) or as
//! data-URI encoded strings (JSON bodies). Both shapes must hash to the
//! same digest for the same underlying bytes, so the data-URI envelope is
//! stripped before hashing.

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 content hash represented as 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute SHA-256 hash of data.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        Self(result.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() != 64 {
            return Err(crate::Error::InvalidHash(format!(
                "expected 64 hex chars, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex_str =
                std::str::from_utf8(chunk).map_err(|e| crate::Error::InvalidHash(e.to_string()))?;
            bytes[i] = u8::from_str_radix(hex_str, 16)
                .map_err(|e| crate::Error::InvalidHash(e.to_string()))?;
        }
        Ok(Self(bytes))
    }

    /// Encode as lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An image payload in one of the accepted transport shapes.
#[derive(Clone, Debug)]
pub enum ImagePayload {
    /// Raw binary bytes from a multipart file upload.
    Bytes(Bytes),
    /// A `data:image/<format>;base64,...` encoded string.
    DataUri(String),
}

impl ImagePayload {
    /// Parse a client-supplied string as a data-URI payload.
    ///
    /// Fails when the string does not carry the `data:image/` envelope.
    pub fn from_data_uri(s: impl Into<String>) -> crate::Result<Self> {
        let s = s.into();
        if !s.starts_with("data:image/") {
            return Err(crate::Error::UnsupportedImageInput(
                "expected a data:image/ base64 string".to_string(),
            ));
        }
        Ok(Self::DataUri(s))
    }

    /// The image format declared by the payload, if any.
    ///
    /// Data URIs carry it in the envelope (`data:image/png;base64,...`).
    /// Raw byte payloads carry no declaration; callers fall back to the
    /// store-reported format.
    pub fn declared_format(&self) -> Option<&str> {
        match self {
            Self::Bytes(_) => None,
            Self::DataUri(s) => {
                let rest = s.strip_prefix("data:image/")?;
                let end = rest.find(';')?;
                Some(&rest[..end])
            }
        }
    }

    /// Decode the payload to its underlying image bytes.
    ///
    /// The data-URI envelope is stripped and base64-decoded so that the
    /// same bytes always decode identically regardless of transport shape.
    pub fn decode(&self) -> crate::Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::DataUri(s) => {
                let comma = s.find(',').ok_or_else(|| {
                    crate::Error::UnsupportedImageInput(
                        "data URI is missing the base64 payload separator".to_string(),
                    )
                })?;
                let header = &s[..comma];
                if !header.starts_with("data:image/") || !header.ends_with(";base64") {
                    return Err(crate::Error::UnsupportedImageInput(format!(
                        "unrecognized data URI header: {header}"
                    )));
                }
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(&s[comma + 1..])
                    .map_err(|e| {
                        crate::Error::UnsupportedImageInput(format!("invalid base64 payload: {e}"))
                    })?;
                Ok(Bytes::from(decoded))
            }
        }
    }

    /// Compute the content hash of the decoded image bytes.
    pub fn digest(&self) -> crate::Result<ContentHash> {
        Ok(ContentHash::compute(&self.decode()?))
    }

    /// Size of the decoded payload in bytes.
    pub fn decoded_len(&self) -> crate::Result<usize> {
        Ok(self.decode()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex_roundtrip() {
        let hash = ContentHash::compute(b"hello world");
        let hex = hash.to_hex();
        let parsed = ContentHash::from_hex(&hex).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_raw_and_data_uri_hash_identically() {
        let bytes = b"\x89PNG\r\n\x1a\nfake image body";
        let raw = ImagePayload::Bytes(Bytes::from_static(bytes));

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let uri = ImagePayload::from_data_uri(format!("data:image/png;base64,{encoded}")).unwrap();

        assert_eq!(raw.digest().unwrap(), uri.digest().unwrap());
    }

    #[test]
    fn test_data_uri_declared_format() {
        let uri = ImagePayload::from_data_uri("data:image/webp;base64,AAAA").unwrap();
        assert_eq!(uri.declared_format(), Some("webp"));

        let raw = ImagePayload::Bytes(Bytes::from_static(b"x"));
        assert_eq!(raw.declared_format(), None);
    }

    #[test]
    fn test_rejects_non_image_data_uri() {
        assert!(ImagePayload::from_data_uri("data:text/plain;base64,AAAA").is_err());
        assert!(ImagePayload::from_data_uri("plain string").is_err());
    }

    #[test]
    fn test_decode_rejects_malformed_envelope() {
        let uri = ImagePayload::DataUri("data:image/png;base64".to_string());
        assert!(uri.decode().is_err());

        let bad_b64 = ImagePayload::DataUri("data:image/png;base64,???".to_string());
        assert!(bad_b64.decode().is_err());
    }
}

//! Core domain types and shared logic for the backroom admin backend.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Content hashing for uploaded image payloads
//! - Product image records and input normalization
//! - Upload results and storage key derivation
//! - Application configuration

pub mod config;
pub mod error;
pub mod hash;
pub mod image;
pub mod upload;

pub use error::{Error, Result};
pub use hash::{ContentHash, ImagePayload};
pub use image::{ImageRecord, MAX_PRODUCT_IMAGES, RawImage, normalize_images};
pub use upload::{STORAGE_KEY_PREFIX, TransformOptions, UploadResult, storage_key_for};

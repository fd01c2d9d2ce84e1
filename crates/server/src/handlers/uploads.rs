//! Image upload handlers.
//!
//! Uploads arrive as a multipart file or as a base64 data URI in a JSON
//! body. Both shapes hash to the same digest, which drives duplicate
//! suppression: first the in-process cache (fast path for double
//! submissions), then the store's existence check (authoritative), and
//! only then a fresh upload.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{
    IMAGES_UPLOADED, UPLOADS_DEDUPLICATED_CACHE, UPLOADS_DEDUPLICATED_STORE, UPLOAD_ERRORS,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use backroom_core::{ImagePayload, TransformOptions, UploadResult, storage_key_for};
use backroom_storage::AssetStore;
use serde::{Deserialize, Serialize};

/// JSON upload body carrying a data-URI encoded image.
#[derive(Debug, Deserialize)]
struct JsonUploadRequest {
    #[serde(rename = "imageData")]
    image_data: Option<String>,
}

/// Extract the image payload from either accepted body shape.
async fn extract_payload(state: &AppState, req: Request) -> ApiResult<ImagePayload> {
    let max_bytes = state.config.server.max_upload_bytes;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart field: {e}")))?
        {
            if field.name() != Some("image") {
                continue;
            }
            if let Some(content_type) = field.content_type()
                && !content_type.starts_with("image/")
            {
                return Err(ApiError::BadRequest(
                    "only image files are allowed".to_string(),
                ));
            }
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?;
            if data.len() > max_bytes {
                return Err(ApiError::BadRequest(format!(
                    "image exceeds maximum size of {max_bytes} bytes"
                )));
            }
            return Ok(ImagePayload::Bytes(data));
        }

        return Err(ApiError::BadRequest(
            "no image data provided; expected an 'image' file field".to_string(),
        ));
    }

    let bytes = axum::body::to_bytes(req.into_body(), max_bytes)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let body: JsonUploadRequest = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?;
    let image_data = body.image_data.ok_or_else(|| {
        ApiError::BadRequest(
            "no image data provided; expected a file upload or base64 image data".to_string(),
        )
    })?;

    ImagePayload::from_data_uri(image_data).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Run the dedup-then-upload flow for a payload.
///
/// Store upload failures are fatal here: the caller must learn their
/// image did not persist.
pub(crate) async fn perform_upload(
    state: &AppState,
    payload: ImagePayload,
) -> ApiResult<UploadResult> {
    let hash = payload.digest()?;

    // Fast path: identical bytes submitted within the TTL window.
    if let Some(cached) = state.upload_cache.get(&hash).await {
        UPLOADS_DEDUPLICATED_CACHE.inc();
        tracing::debug!(content_hash = %hash, "duplicate upload served from cache");
        return Ok(cached.as_duplicate());
    }

    let key = storage_key_for(&hash);

    // Authoritative dedup guard: the store itself.
    if let Some(existing) = state.storage.exists(&key).await? {
        UPLOADS_DEDUPLICATED_STORE.inc();
        tracing::debug!(content_hash = %hash, "image already present in asset store");
        return Ok(UploadResult {
            url: existing.url,
            storage_key: existing.storage_key,
            content_hash: hash.to_hex(),
            format: existing.format,
            size_bytes: existing.size_bytes,
            width: existing.width,
            height: existing.height,
            is_duplicate: true,
        });
    }

    let meta = state
        .storage
        .upload(&payload, &key, &TransformOptions::default())
        .await
        .inspect_err(|e| {
            UPLOAD_ERRORS.inc();
            tracing::error!(content_hash = %hash, error = %e, "asset store upload failed");
        })?;

    let result = UploadResult {
        url: meta.url,
        storage_key: meta.storage_key,
        content_hash: hash.to_hex(),
        format: meta.format,
        size_bytes: meta.size_bytes,
        width: meta.width,
        height: meta.height,
        is_duplicate: false,
    };
    state.upload_cache.put(hash, result.clone()).await;
    IMAGES_UPLOADED.inc();
    tracing::info!(content_hash = %hash, storage_key = %result.storage_key, "image uploaded");

    Ok(result)
}

/// POST /api/upload/image - Upload an image (multipart file or base64 JSON).
#[tracing::instrument(skip(state, req))]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    req: Request,
) -> ApiResult<Json<UploadResult>> {
    user.require_admin()?;

    let payload = extract_payload(&state, req).await?;
    let result = perform_upload(&state, payload).await?;
    Ok(Json(result))
}

/// Deletion response.
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub deleted: bool,
    #[serde(rename = "storageKey")]
    pub storage_key: String,
}

/// DELETE /api/upload/image/{storage_key} - Delete a stored image.
#[tracing::instrument(skip(state), fields(storage_key = %storage_key))]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(storage_key): Path<String>,
) -> ApiResult<Json<DeleteImageResponse>> {
    user.require_admin()?;

    if storage_key.trim().is_empty() {
        return Err(ApiError::BadRequest("storage key is required".to_string()));
    }

    let deleted = state.storage.destroy(&storage_key).await?;
    if !deleted {
        return Err(ApiError::NotFound(
            "image not found or already deleted".to_string(),
        ));
    }

    tracing::info!(storage_key = %storage_key, "image deleted");
    Ok(Json(DeleteImageResponse {
        deleted,
        storage_key,
    }))
}

//! Product CRUD handlers.
//!
//! The image list travels through `normalize_images` on every write and
//! is persisted wholesale; updates diff the stored list against the new
//! one and clean up dropped assets best-effort.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{PageParams, Pagination};
use crate::lifecycle::{cleanup_images, removed_urls};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use backroom_core::{ImageRecord, RawImage, normalize_images};
use backroom_metadata::models::{ProductFilter, ProductRow};
use backroom_metadata::repos::ProductRepo;
use backroom_storage::BatchDelete;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Product representation returned to clients.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub material: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub price: f64,
    pub mrp: f64,
    pub stock: i64,
    pub images: Vec<ImageRecord>,
    #[serde(rename = "specialFeature")]
    pub special_feature: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,
    pub slug: String,
    pub sku: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ProductResponse {
    pub(crate) fn from_row(row: &ProductRow) -> ApiResult<Self> {
        Ok(Self {
            id: row.product_id,
            name: row.name.clone(),
            description: row.description.clone(),
            category: row.category.clone(),
            brand: row.brand.clone(),
            material: row.material.clone(),
            colors: row.colors()?,
            sizes: row.sizes()?,
            price: row.price,
            mrp: row.mrp,
            stock: row.stock,
            images: row.images()?,
            special_feature: row.special_feature.clone(),
            is_active: row.is_active,
            is_featured: row.is_featured,
            slug: row.slug.clone(),
            sku: row.sku.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filter parameters for product listings; pagination comes in through
/// a separate [`PageParams`] extractor.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// Paginated product listing response.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub data: Vec<ProductResponse>,
    pub pagination: Pagination,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn clean_string_list(values: &Option<Vec<String>>) -> Vec<String> {
    values
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}

fn generate_sku(product_id: &Uuid) -> String {
    format!("SKU-{}", &product_id.simple().to_string()[..8].to_uppercase())
}

/// GET /api/products - List products with filters and pagination.
#[tracing::instrument(skip(state, page, query))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<ProductListResponse>> {
    let filter = ProductFilter {
        category: trimmed(&query.category),
        featured_only: query.featured.unwrap_or(false),
        search: trimmed(&query.search),
    };

    let total = state.metadata.count_products(&filter).await?;
    let rows = state
        .metadata
        .list_products(&filter, page.offset(), page.limit())
        .await?;

    let data = rows
        .iter()
        .map(ProductResponse::from_row)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(ProductListResponse {
        data,
        pagination: Pagination::new(&page, total),
    }))
}

/// GET /api/products/{id} - Fetch a single product.
#[tracing::instrument(skip(state), fields(product_id = %product_id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<ProductResponse>> {
    let row = state
        .metadata
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))?;
    Ok(Json(ProductResponse::from_row(&row)?))
}

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub price: Option<f64>,
    pub mrp: Option<f64>,
    pub stock: Option<i64>,
    pub images: Option<Vec<RawImage>>,
    #[serde(rename = "specialFeature")]
    pub special_feature: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[serde(rename = "isFeatured")]
    pub is_featured: Option<bool>,
}

fn require_text(value: &Option<String>, field: &str) -> ApiResult<String> {
    trimmed(value).ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// POST /api/products - Create a product.
#[tracing::instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    user.require_admin()?;

    // Validation happens before any side effect.
    let name = require_text(&body.name, "name")?;
    let description = require_text(&body.description, "description")?;
    let category = require_text(&body.category, "category")?;
    let material = require_text(&body.material, "material")?;
    let price = body
        .price
        .ok_or_else(|| ApiError::BadRequest("price is required".to_string()))?;
    let stock = body
        .stock
        .ok_or_else(|| ApiError::BadRequest("stock is required".to_string()))?;

    let images = normalize_images(body.images.unwrap_or_default());

    let product_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    let mut row = ProductRow {
        product_id,
        slug: slugify(&name),
        sku: generate_sku(&product_id),
        name,
        description,
        category,
        brand: trimmed(&body.brand).unwrap_or_else(|| "Royal Thread".to_string()),
        material,
        colors_json: serde_json::to_string(&clean_string_list(&body.colors))
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        sizes_json: serde_json::to_string(&clean_string_list(&body.sizes))
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        price,
        mrp: body.mrp.unwrap_or(price),
        stock,
        images_json: String::new(),
        special_feature: trimmed(&body.special_feature).unwrap_or_default(),
        is_active: body.is_active.unwrap_or(true),
        is_featured: body.is_featured.unwrap_or(false),
        created_at: now,
        updated_at: now,
    };
    row.set_images(&images).map_err(ApiError::Metadata)?;

    state.metadata.create_product(&row).await?;
    tracing::info!(product_id = %product_id, image_count = images.len(), "product created");

    Ok((StatusCode::CREATED, Json(ProductResponse::from_row(&row)?)))
}

/// Update request body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub price: Option<f64>,
    pub mrp: Option<f64>,
    pub stock: Option<i64>,
    pub images: Option<Vec<RawImage>>,
    #[serde(rename = "specialFeature")]
    pub special_feature: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[serde(rename = "isFeatured")]
    pub is_featured: Option<bool>,
}

/// Update response, carrying the cleanup outcome when images changed.
#[derive(Debug, Serialize)]
pub struct UpdateProductResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<BatchDelete>,
}

/// PUT /api/products/{id} - Update a product.
///
/// When `images` is supplied the stored list is replaced wholesale:
/// assets dropped from the list are deleted from the store best-effort,
/// and a partial cleanup failure never blocks the update.
#[tracing::instrument(skip(state, body), fields(product_id = %product_id))]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> ApiResult<Json<UpdateProductResponse>> {
    user.require_admin()?;

    let mut row = state
        .metadata
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))?;

    if let Some(name) = trimmed(&body.name) {
        row.slug = slugify(&name);
        row.name = name;
    }
    if let Some(description) = trimmed(&body.description) {
        row.description = description;
    }
    if let Some(category) = trimmed(&body.category) {
        row.category = category;
    }
    if let Some(brand) = trimmed(&body.brand) {
        row.brand = brand;
    }
    if let Some(material) = trimmed(&body.material) {
        row.material = material;
    }
    if body.colors.is_some() {
        row.colors_json = serde_json::to_string(&clean_string_list(&body.colors))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }
    if body.sizes.is_some() {
        row.sizes_json = serde_json::to_string(&clean_string_list(&body.sizes))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }
    if let Some(price) = body.price {
        row.price = price;
    }
    if let Some(mrp) = body.mrp {
        row.mrp = mrp;
    }
    if let Some(stock) = body.stock {
        row.stock = stock;
    }
    if let Some(special_feature) = trimmed(&body.special_feature) {
        row.special_feature = special_feature;
    }
    if let Some(is_active) = body.is_active {
        row.is_active = is_active;
    }
    if let Some(is_featured) = body.is_featured {
        row.is_featured = is_featured;
    }

    let mut cleanup = None;
    if let Some(raw_images) = body.images {
        let old_images = row.images().map_err(ApiError::Metadata)?;
        let new_images = normalize_images(raw_images);

        let to_delete = removed_urls(&old_images, &new_images);
        if !to_delete.is_empty() {
            // Best-effort: the persisted state must track caller intent
            // even when remote cleanup partially fails.
            cleanup = Some(cleanup_images(state.storage.as_ref(), &to_delete).await);
        }

        row.set_images(&new_images).map_err(ApiError::Metadata)?;
    }

    row.updated_at = OffsetDateTime::now_utc();
    let updated = state.metadata.update_product(&row).await?;
    if !updated {
        return Err(ApiError::NotFound("product not found".to_string()));
    }
    tracing::info!(product_id = %product_id, "product updated");

    Ok(Json(UpdateProductResponse {
        product: ProductResponse::from_row(&row)?,
        cleanup,
    }))
}

/// Delete response.
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<BatchDelete>,
}

/// DELETE /api/products/{id} - Delete a product and its images.
///
/// Image cleanup runs first, best-effort; the record is deleted
/// regardless of the cleanup outcome.
#[tracing::instrument(skip(state), fields(product_id = %product_id))]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<DeleteProductResponse>> {
    user.require_admin()?;

    let row = state
        .metadata
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))?;

    let images = row.images().map_err(ApiError::Metadata)?;
    let urls: Vec<String> = images.iter().map(|img| img.url.clone()).collect();
    let cleanup = if urls.is_empty() {
        None
    } else {
        Some(cleanup_images(state.storage.as_ref(), &urls).await)
    };

    let deleted = state.metadata.delete_product(product_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("product not found".to_string()));
    }
    tracing::info!(product_id = %product_id, "product deleted");

    Ok(Json(DeleteProductResponse { deleted, cleanup }))
}

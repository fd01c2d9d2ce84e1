//! Storefront user handlers.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{PageParams, Pagination};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use backroom_metadata::models::UserRow;
use backroom_metadata::repos::UserRepo;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// User representation returned to clients. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub mobile: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(
        rename = "lastLogin",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login: Option<OffsetDateTime>,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl UserResponse {
    fn from_row(row: &UserRow) -> Self {
        Self {
            id: row.user_id,
            name: row.name.clone(),
            email: row.email.clone(),
            role: row.role.clone(),
            mobile: row.mobile.clone(),
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

/// Paginated user listing response.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

/// GET /api/users - List users with pagination.
#[tracing::instrument(skip(state, page))]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<UserListResponse>> {
    user.require_admin()?;

    let total = state.metadata.count_users().await?;
    let rows = state
        .metadata
        .list_users(page.offset(), page.limit())
        .await?;

    Ok(Json(UserListResponse {
        data: rows.iter().map(UserResponse::from_row).collect(),
        pagination: Pagination::new(&page, total),
    }))
}

/// GET /api/users/{id} - Fetch a single user.
#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    user.require_admin()?;

    let row = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(UserResponse::from_row(&row)))
}

/// Active-flag update request body.
#[derive(Debug, Deserialize)]
pub struct SetUserActiveRequest {
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// PUT /api/users/{id}/active - Activate or deactivate a user.
#[tracing::instrument(skip(state, body), fields(user_id = %user_id))]
pub async fn set_user_active(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<SetUserActiveRequest>,
) -> ApiResult<Json<UserResponse>> {
    user.require_admin()?;

    let is_active = body
        .is_active
        .ok_or_else(|| ApiError::BadRequest("isActive is required".to_string()))?;

    let updated = state.metadata.set_user_active(user_id, is_active).await?;
    if !updated {
        return Err(ApiError::NotFound("user not found".to_string()));
    }

    let row = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    tracing::info!(user_id = %user_id, is_active, "user active flag updated");
    Ok(Json(UserResponse::from_row(&row)))
}

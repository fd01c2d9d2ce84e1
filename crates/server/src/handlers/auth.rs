//! Authentication handlers: first-admin bootstrap, login, registration.

use crate::auth::issue_token;
use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password, verify_password};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use backroom_metadata::models::{AdminRow, UserRow};
use backroom_metadata::repos::{AdminRepo, UserRepo};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for first-admin creation and user registration.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub mobile: Option<String>,
}

/// Admin fields safe to return to clients.
#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub mobile: Option<String>,
}

impl AdminSummary {
    fn from_row(row: &AdminRow) -> Self {
        Self {
            id: row.admin_id,
            name: row.name.clone(),
            email: row.email.clone(),
            role: row.role.clone(),
            mobile: row.mobile.clone(),
        }
    }
}

fn require_field<'a>(value: &'a Option<String>, field: &str) -> ApiResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// POST /api/auth/create-admin - Create the first admin account.
///
/// Unauthenticated by design: it only succeeds while no admin exists.
#[tracing::instrument(skip(state, body))]
pub async fn create_admin(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AdminSummary>)> {
    let email = require_field(&body.email, "email")?.to_lowercase();
    let password = require_field(&body.password, "password")?;

    if state.metadata.any_admin_exists().await? {
        return Err(ApiError::BadRequest(
            "admin account already exists".to_string(),
        ));
    }
    if state.metadata.get_admin_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "admin already exists with this email".to_string(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let admin = AdminRow {
        admin_id: Uuid::new_v4(),
        name: body
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Admin")
            .to_string(),
        email,
        password_hash: hash_password(password),
        role: "admin".to_string(),
        mobile: body.mobile.clone(),
        is_active: true,
        last_login: None,
        reset_token: None,
        reset_token_expires_at: None,
        otp_code: None,
        otp_expires_at: None,
        otp_attempts: 0,
        created_at: now,
        updated_at: now,
    };
    state.metadata.create_admin(&admin).await?;
    tracing::info!(admin_id = %admin.admin_id, "first admin account created");

    Ok((StatusCode::CREATED, Json(AdminSummary::from_row(&admin))))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub admin: AdminSummary,
    pub token: String,
}

/// POST /api/auth/admin/login - Admin login.
#[tracing::instrument(skip(state, body))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = require_field(&body.email, "email")?;
    let password = require_field(&body.password, "password")?;

    // A missing account and a wrong password are indistinguishable to the
    // caller.
    let admin = state
        .metadata
        .get_admin_by_email(email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    if !verify_password(password, &admin.password_hash) {
        return Err(ApiError::Unauthorized(
            "invalid email or password".to_string(),
        ));
    }

    let token = issue_token(
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl(),
        admin.admin_id,
        &admin.role,
    )?;

    let now = OffsetDateTime::now_utc();
    state.metadata.record_admin_login(admin.admin_id, now).await?;
    tracing::info!(admin_id = %admin.admin_id, "admin logged in");

    Ok(Json(LoginResponse {
        admin: AdminSummary::from_row(&admin),
        token,
    }))
}

/// User fields safe to return to clients.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// POST /api/auth/register - Storefront user registration.
#[tracing::instrument(skip(state, body))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    let email = require_field(&body.email, "email")?.to_lowercase();
    let password = require_field(&body.password, "password")?;

    if state.metadata.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "user already exists with this email".to_string(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let user = UserRow {
        user_id: Uuid::new_v4(),
        name: body
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("User")
            .to_string(),
        email,
        password_hash: hash_password(password),
        role: "user".to_string(),
        mobile: body.mobile.clone(),
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };
    state.metadata.create_user(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserSummary {
            id: user.user_id,
            name: user.name,
            email: user.email,
            role: user.role,
        }),
    ))
}

//! Admin account handlers: password reset, OTP flows, stats.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::password::hash_password;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use backroom_metadata::repos::AdminRepo;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Failed OTP attempts tolerated before a code is refused.
const MAX_OTP_ATTEMPTS: i64 = 3;

/// Reset token validity window.
const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// OTP validity window.
const OTP_TTL: Duration = Duration::minutes(10);

/// Generic acknowledgement body.
///
/// Account-recovery endpoints answer identically whether or not the
/// email exists, so responses never leak account presence.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn generate_reset_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn generate_otp_code() -> String {
    use rand::Rng;
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

fn require_field<'a>(value: &'a Option<String>, field: &str) -> ApiResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// Request body carrying only an email.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

/// POST /api/admin/forgot-password - Begin a reset-link flow.
#[tracing::instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = require_field(&body.email, "email")?.to_lowercase();

    let acknowledgement = MessageResponse {
        message: "If the email exists, password reset instructions have been sent".to_string(),
    };

    let Some(admin) = state.metadata.get_admin_by_email(&email).await? else {
        return Ok(Json(acknowledgement));
    };

    let token = generate_reset_token();
    let expires_at = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;
    state
        .metadata
        .set_reset_token(admin.admin_id, &token, expires_at)
        .await?;

    if let Err(e) = state
        .mailer
        .send_password_reset(&admin.email, &admin.name, &token)
        .await
    {
        // Delivery failure must not reveal that the account exists.
        tracing::error!(admin_id = %admin.admin_id, error = %e,
            "failed to send password reset email");
    }

    Ok(Json(acknowledgement))
}

/// Reset-by-token request body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// POST /api/admin/reset-password - Complete a reset-link flow.
#[tracing::instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let token = require_field(&body.token, "token")?;
    let new_password = require_field(&body.new_password, "newPassword")?;

    let now = OffsetDateTime::now_utc();
    let admin = state
        .metadata
        .get_admin_by_reset_token(token, now)
        .await?
        .ok_or_else(|| ApiError::BadRequest("invalid or expired reset token".to_string()))?;

    state
        .metadata
        .update_admin_password(admin.admin_id, &hash_password(new_password))
        .await?;
    state.metadata.clear_reset_token(admin.admin_id).await?;
    tracing::info!(admin_id = %admin.admin_id, "password reset via token");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully".to_string(),
    }))
}

/// POST /api/admin/send-otp - Generate and send a one-time password.
#[tracing::instrument(skip(state, body))]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = require_field(&body.email, "email")?.to_lowercase();

    let acknowledgement = MessageResponse {
        message: "If the email exists, OTP has been sent".to_string(),
    };

    let Some(admin) = state.metadata.get_admin_by_email(&email).await? else {
        return Ok(Json(acknowledgement));
    };

    let code = generate_otp_code();
    let expires_at = OffsetDateTime::now_utc() + OTP_TTL;
    state
        .metadata
        .set_otp(admin.admin_id, &code, expires_at)
        .await?;

    if let Err(e) = state.mailer.send_otp(&admin.email, &admin.name, &code).await {
        tracing::error!(admin_id = %admin.admin_id, error = %e, "failed to send OTP email");
    }

    Ok(Json(acknowledgement))
}

/// OTP verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// Look up the admin for a submitted OTP, tracking failed attempts.
///
/// On a miss the account is fetched a second time by email so the
/// attempt counter can be bumped; a matching code is still refused once
/// the account has accumulated [`MAX_OTP_ATTEMPTS`] failures.
async fn verify_otp_lookup(
    state: &AppState,
    email: &str,
    otp: &str,
) -> ApiResult<backroom_metadata::models::AdminRow> {
    let now = OffsetDateTime::now_utc();
    let admin = state.metadata.get_admin_by_otp(email, otp, now).await?;

    let Some(admin) = admin else {
        if let Some(existing) = state.metadata.get_admin_by_email(email).await? {
            state
                .metadata
                .increment_otp_attempts(existing.admin_id)
                .await?;
        }
        return Err(ApiError::BadRequest("invalid or expired OTP".to_string()));
    };

    if admin.otp_attempts >= MAX_OTP_ATTEMPTS {
        return Err(ApiError::BadRequest(
            "too many failed attempts, please request a new OTP".to_string(),
        ));
    }

    Ok(admin)
}

/// POST /api/admin/verify-otp - Check a one-time password.
#[tracing::instrument(skip(state, body))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = require_field(&body.email, "email")?.to_lowercase();
    let otp = require_field(&body.otp, "otp")?;

    verify_otp_lookup(&state, &email, otp).await?;

    Ok(Json(MessageResponse {
        message: "OTP verified successfully".to_string(),
    }))
}

/// POST /api/admin/verify-otp-reset-password - Verify an OTP and set a new password.
#[tracing::instrument(skip(state, body))]
pub async fn verify_otp_and_reset_password(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = require_field(&body.email, "email")?.to_lowercase();
    let otp = require_field(&body.otp, "otp")?;
    let new_password = require_field(&body.new_password, "newPassword")?;

    let admin = verify_otp_lookup(&state, &email, otp).await?;

    state
        .metadata
        .update_admin_password(admin.admin_id, &hash_password(new_password))
        .await?;
    state.metadata.clear_otp(admin.admin_id).await?;
    tracing::info!(admin_id = %admin.admin_id, "password reset via OTP");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully".to_string(),
    }))
}

/// Admin stats response.
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    #[serde(rename = "totalAdmins")]
    pub total_admins: i64,
    #[serde(rename = "activeAdmins")]
    pub active_admins: i64,
}

/// GET /api/admin/stats - Admin account counts.
#[tracing::instrument(skip(state))]
pub async fn admin_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<AdminStatsResponse>> {
    user.require_admin()?;

    let total_admins = state.metadata.count_admins().await?;
    let active_admins = state.metadata.count_active_admins().await?;

    Ok(Json(AdminStatsResponse {
        total_admins,
        active_admins,
    }))
}

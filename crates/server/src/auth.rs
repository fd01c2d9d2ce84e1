//! Authentication and authorization middleware.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// JWT claims carried by admin tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID.
    pub sub: String,
    /// Account role ("admin" for panel operators).
    pub role: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Authenticated request extension.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    /// The account ID from the token.
    pub id: Uuid,
    /// The account role from the token.
    pub role: String,
}

impl AuthenticatedUser {
    /// Whether the account holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Require the admin role, returning an error if not present.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "admin privileges required".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
    }
}

/// Issue a signed JWT for an account.
pub fn issue_token(
    secret: &str,
    ttl: time::Duration,
    account_id: Uuid,
    role: &str,
) -> ApiResult<String> {
    let expires_at = OffsetDateTime::now_utc() + ttl;
    let claims = Claims {
        sub: account_id.to_string(),
        role: role.to_string(),
        exp: expires_at.unix_timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// Validate a JWT and recover the authenticated user.
fn validate_token(secret: &str, token: &str) -> ApiResult<AuthenticatedUser> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            ApiError::Unauthorized("token expired".to_string())
        }
        _ => ApiError::Unauthorized("invalid token".to_string()),
    })?;

    let id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| ApiError::Unauthorized("invalid token subject".to_string()))?;

    Ok(AuthenticatedUser {
        id,
        role: data.claims.role,
    })
}

/// Authentication middleware.
///
/// Requests without an Authorization header pass through untouched;
/// handlers that need an identity reject them via the
/// [`AuthenticatedUser`] extractor. A present but malformed or expired
/// token is rejected immediately.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(header) = header {
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected a bearer token".to_string()))?;
        let user = validate_token(&state.config.auth.jwt_secret, token)?;
        tracing::debug!(account_id = %user.id, role = %user.role, "request authenticated");
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}

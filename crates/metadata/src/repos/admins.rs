//! Admin account repository trait.

use crate::error::MetadataResult;
use crate::models::AdminRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for admin accounts and their reset/OTP state.
#[async_trait]
pub trait AdminRepo: Send + Sync {
    /// Create a new admin account.
    async fn create_admin(&self, admin: &AdminRow) -> MetadataResult<()>;

    /// Get an admin by ID.
    async fn get_admin(&self, admin_id: Uuid) -> MetadataResult<Option<AdminRow>>;

    /// Get an admin by email (case-insensitive).
    async fn get_admin_by_email(&self, email: &str) -> MetadataResult<Option<AdminRow>>;

    /// Whether any admin account exists (first-admin bootstrap check).
    async fn any_admin_exists(&self) -> MetadataResult<bool>;

    /// Total number of admin accounts.
    async fn count_admins(&self) -> MetadataResult<i64>;

    /// Number of active admin accounts.
    async fn count_active_admins(&self) -> MetadataResult<i64>;

    /// Record a successful login.
    async fn record_admin_login(&self, admin_id: Uuid, at: OffsetDateTime) -> MetadataResult<()>;

    /// Replace an admin's password hash.
    async fn update_admin_password(&self, admin_id: Uuid, password_hash: &str)
    -> MetadataResult<()>;

    /// Store a password-reset token with its expiry.
    async fn set_reset_token(
        &self,
        admin_id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Find the admin holding an unexpired reset token.
    async fn get_admin_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<AdminRow>>;

    /// Clear any stored reset token.
    async fn clear_reset_token(&self, admin_id: Uuid) -> MetadataResult<()>;

    /// Store an OTP code with its expiry, resetting the attempt counter.
    async fn set_otp(
        &self,
        admin_id: Uuid,
        code: &str,
        expires_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Find the admin matching (email, code) with an unexpired OTP.
    async fn get_admin_by_otp(
        &self,
        email: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<AdminRow>>;

    /// Increment the failed-OTP attempt counter.
    async fn increment_otp_attempts(&self, admin_id: Uuid) -> MetadataResult<()>;

    /// Clear any stored OTP state.
    async fn clear_otp(&self, admin_id: Uuid) -> MetadataResult<()>;
}

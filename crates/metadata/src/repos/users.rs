//! User repository trait.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for storefront user records.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a new user.
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Get a user by ID.
    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>>;

    /// List users newest-first with pagination.
    async fn list_users(&self, offset: i64, limit: i64) -> MetadataResult<Vec<UserRow>>;

    /// Count non-admin users.
    async fn count_users(&self) -> MetadataResult<i64>;

    /// Set a user's active flag. Returns `false` when the user is absent.
    async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> MetadataResult<bool>;
}

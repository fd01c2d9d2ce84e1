//! First-admin account initialization.

use crate::password::hash_password;
use anyhow::{Result, bail};
use backroom_core::config::BootstrapAdminConfig;
use backroom_metadata::MetadataStore;
use backroom_metadata::repos::AdminRepo;
use backroom_metadata::models::AdminRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Ensure an admin account exists.
///
/// When the store already holds an admin, this is a no-op. Otherwise the
/// configured bootstrap account is created; with no bootstrap config the
/// server still starts, and the first admin must be created through
/// `POST /api/auth/create-admin`.
pub async fn ensure_admin_account(
    metadata: &dyn MetadataStore,
    config: Option<&BootstrapAdminConfig>,
) -> Result<()> {
    if metadata.any_admin_exists().await? {
        tracing::debug!("admin account already exists");
        return Ok(());
    }

    let Some(config) = config else {
        tracing::warn!(
            "no admin account exists and no bootstrap_admin is configured; \
             create one via POST /api/auth/create-admin"
        );
        return Ok(());
    };

    let email = config.email.trim().to_lowercase();
    if email.is_empty() {
        bail!("bootstrap_admin.email must not be empty");
    }
    if config.password.is_empty() {
        bail!("bootstrap_admin.password must not be empty");
    }

    let now = OffsetDateTime::now_utc();
    let admin = AdminRow {
        admin_id: Uuid::new_v4(),
        name: config
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Admin")
            .to_string(),
        email,
        password_hash: hash_password(&config.password),
        role: "admin".to_string(),
        mobile: None,
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
    metadata.create_admin(&admin).await?;
    tracing::info!(admin_id = %admin.admin_id, email = %admin.email,
        "bootstrap admin account created");
    Ok(())
}

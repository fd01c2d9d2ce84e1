//! Outbound email collaborator.
//!
//! Template rendering and SMTP delivery live outside this service; the
//! trait is the narrow seam the handlers speak to. Delivery failures are
//! reported to the caller, which logs and moves on — a reset request must
//! not reveal whether the address exists by failing differently.

use async_trait::async_trait;

/// Sends account emails to admins.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send a password-reset link for the given token.
    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        reset_token: &str,
    ) -> Result<(), String>;

    /// Send a one-time password code.
    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), String>;
}

/// Mailer that records sends in the log stream.
///
/// Stands in wherever a real delivery backend is not wired up (local
/// development, tests without a recording mock).
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        reset_token: &str,
    ) -> Result<(), String> {
        tracing::info!(email = %email, name = %name, reset_token = %reset_token,
            "password reset email queued");
        Ok(())
    }

    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), String> {
        tracing::info!(email = %email, name = %name, code = %code, "OTP email queued");
        Ok(())
    }
}

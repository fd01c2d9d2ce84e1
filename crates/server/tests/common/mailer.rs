//! Recording mailer for tests.

use async_trait::async_trait;
use backroom_server::Mailer;
use std::sync::Mutex;

/// A sent email captured by the recording mailer.
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub struct SentEmail {
    pub email: String,
    pub name: String,
    /// Reset token or OTP code.
    pub secret: String,
    pub kind: EmailKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum EmailKind {
    PasswordReset,
    Otp,
}

/// Mailer that records every send for later assertions.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// The most recent secret (reset token or OTP) sent to an address.
    pub fn last_secret_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| e.email == email)
            .map(|e| e.secret.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        reset_token: &str,
    ) -> Result<(), String> {
        self.sent.lock().unwrap().push(SentEmail {
            email: email.to_string(),
            name: name.to_string(),
            secret: reset_token.to_string(),
            kind: EmailKind::PasswordReset,
        });
        Ok(())
    }

    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), String> {
        self.sent.lock().unwrap().push(SentEmail {
            email: email.to_string(),
            name: name.to_string(),
            secret: code.to_string(),
            kind: EmailKind::Otp,
        });
        Ok(())
    }
}

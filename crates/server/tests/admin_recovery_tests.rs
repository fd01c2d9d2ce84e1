//! Password reset and OTP flow integration tests.

mod common;

use axum::http::StatusCode;
use backroom_metadata::repos::AdminRepo;
use common::mailer::EmailKind;
use common::server::TestServer;
use serde_json::json;

#[tokio::test]
async fn forgot_password_flow_resets_via_emailed_token() {
    let server = TestServer::new().await;
    server.seed_admin("root@example.com", "old-password").await;

    let (status, _) = server
        .post(
            "/api/admin/forgot-password",
            None,
            json!({"email": "root@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = server
        .mailer
        .last_secret_for("root@example.com")
        .expect("reset email not sent");
    assert_eq!(server.mailer.sent()[0].kind, EmailKind::PasswordReset);

    let (status, _) = server
        .post(
            "/api/admin/reset-password",
            None,
            json!({"token": token, "newPassword": "new-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Old password is dead, new one works.
    let (status, _) = server
        .post(
            "/api/auth/admin/login",
            None,
            json!({"email": "root@example.com", "password": "old-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = server
        .post(
            "/api/auth/admin/login",
            None,
            json!({"email": "root@example.com", "password": "new-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The token is single-use.
    let (status, _) = server
        .post(
            "/api/admin/reset-password",
            None,
            json!({"token": token, "newPassword": "again"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forgot_password_does_not_reveal_unknown_emails() {
    let server = TestServer::new().await;
    server.seed_admin("root@example.com", "pw").await;

    let (status, known) = server
        .post(
            "/api/admin/forgot-password",
            None,
            json!({"email": "root@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, unknown) = server
        .post(
            "/api/admin/forgot-password",
            None,
            json!({"email": "ghost@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(known["message"], unknown["message"]);
    // Only the real account got an email.
    assert_eq!(server.mailer.sent().len(), 1);
}

#[tokio::test]
async fn otp_flow_verifies_and_resets_password() {
    let server = TestServer::new().await;
    server.seed_admin("root@example.com", "old-password").await;

    let (status, _) = server
        .post("/api/admin/send-otp", None, json!({"email": "root@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let code = server
        .mailer
        .last_secret_for("root@example.com")
        .expect("OTP email not sent");
    assert_eq!(code.len(), 6);

    let (status, _) = server
        .post(
            "/api/admin/verify-otp",
            None,
            json!({"email": "root@example.com", "otp": code}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .post(
            "/api/admin/verify-otp-reset-password",
            None,
            json!({"email": "root@example.com", "otp": code, "newPassword": "fresh"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .post(
            "/api/auth/admin/login",
            None,
            json!({"email": "root@example.com", "password": "fresh"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The OTP was cleared with the reset.
    let (status, _) = server
        .post(
            "/api/admin/verify-otp",
            None,
            json!({"email": "root@example.com", "otp": code}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn three_failed_attempts_lock_out_the_correct_code() {
    let server = TestServer::new().await;
    let (admin_id, _) = server.seed_admin("root@example.com", "pw").await;

    server
        .post("/api/admin/send-otp", None, json!({"email": "root@example.com"}))
        .await;
    let code = server.mailer.last_secret_for("root@example.com").unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    for _ in 0..3 {
        let (status, _) = server
            .post(
                "/api/admin/verify-otp",
                None,
                json!({"email": "root@example.com", "otp": wrong}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let row = server
        .state
        .metadata
        .get_admin(admin_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.otp_attempts, 3);

    // Even the correct code is now refused until a new OTP is issued.
    let (status, body) = server
        .post(
            "/api/admin/verify-otp",
            None,
            json!({"email": "root@example.com", "otp": code}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("too many"));

    // Requesting a fresh OTP resets the counter.
    server
        .post("/api/admin/send-otp", None, json!({"email": "root@example.com"}))
        .await;
    let fresh = server.mailer.last_secret_for("root@example.com").unwrap();
    let (status, _) = server
        .post(
            "/api/admin/verify-otp",
            None,
            json!({"email": "root@example.com", "otp": fresh}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

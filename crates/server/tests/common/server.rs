//! Server test utilities.

use super::mailer::RecordingMailer;
use super::storage::CountingStore;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use backroom_core::config::{AppConfig, MetadataConfig, StorageConfig};
use backroom_metadata::models::AdminRow;
use backroom_metadata::repos::AdminRepo;
use backroom_metadata::{MetadataStore, SqliteStore};
use backroom_server::auth::issue_token;
use backroom_server::password::hash_password;
use backroom_server::{AppState, TracingMailer, create_router};
use std::sync::Arc;
use tempfile::TempDir;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

/// Public base URL used by the test filesystem store.
pub const TEST_BASE_URL: &str = "http://localhost:8000/uploads";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: Router,
    pub state: AppState,
    pub storage: Arc<CountingStore>,
    pub mailer: Arc<RecordingMailer>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage and a recording mailer.
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("assets");
        std::fs::create_dir_all(&storage_path).expect("Failed to create storage directory");
        let storage = Arc::new(
            CountingStore::new(&storage_path, TEST_BASE_URL)
                .await
                .expect("Failed to create storage backend"),
        );

        let db_path = temp_dir.path().join("backroom.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        let mailer = Arc::new(RecordingMailer::default());

        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem {
            path: storage_path,
            public_base_url: TEST_BASE_URL.to_string(),
        };
        config.metadata = MetadataConfig::Sqlite { path: db_path };

        let state = AppState::new(config, storage.clone(), metadata, mailer.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            storage,
            mailer,
            _temp_dir: temp_dir,
        }
    }

    /// Insert an admin account directly and return a bearer token for it.
    pub async fn seed_admin(&self, email: &str, password: &str) -> (Uuid, String) {
        let now = OffsetDateTime::now_utc();
        let admin = AdminRow {
            admin_id: Uuid::new_v4(),
            name: "Test Admin".to_string(),
            email: email.to_lowercase(),
            password_hash: hash_password(password),
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
        self.state
            .metadata
            .create_admin(&admin)
            .await
            .expect("Failed to seed admin");
        let token = self.token_for(admin.admin_id, "admin");
        (admin.admin_id, token)
    }

    /// Issue a token for an arbitrary account id and role.
    pub fn token_for(&self, account_id: Uuid, role: &str) -> String {
        issue_token(
            &self.state.config.auth.jwt_secret,
            self.state.config.auth.token_ttl(),
            account_id,
            role,
        )
        .expect("Failed to issue token")
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Use the tracing mailer instead of the recorder (rarely needed).
    pub fn tracing_mailer() -> Arc<TracingMailer> {
        Arc::new(TracingMailer)
    }
}

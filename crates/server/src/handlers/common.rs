//! Shared handler helpers.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Query parameters for paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl PageParams {
    /// Page number clamped to at least 1.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Page size clamped to [1, 100].
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }

    /// Row offset for the current page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Pagination metadata returned alongside listings.
#[derive(Debug, Serialize)]
pub struct Pagination {
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub total: i64,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "hasPrevPage")]
    pub has_prev_page: bool,
}

impl Pagination {
    /// Build pagination metadata for a listing.
    pub fn new(params: &PageParams, total: i64) -> Self {
        let limit = params.limit();
        let page = params.page();
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            current_page: page,
            total_pages,
            total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
    pub version: String,
}

/// GET /health - liveness probe.
///
/// Intentionally unauthenticated for load balancers and probes.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "backroom API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

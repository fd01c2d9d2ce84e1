//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use backroom_core::config::StorageConfig;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth
        .route("/api/auth/create-admin", post(handlers::create_admin))
        .route("/api/auth/admin/login", post(handlers::admin_login))
        .route("/api/auth/register", post(handlers::register_user))
        // Admin account recovery and stats
        .route("/api/admin/forgot-password", post(handlers::forgot_password))
        .route("/api/admin/reset-password", post(handlers::reset_password))
        .route("/api/admin/send-otp", post(handlers::send_otp))
        .route("/api/admin/verify-otp", post(handlers::verify_otp))
        .route(
            "/api/admin/verify-otp-reset-password",
            post(handlers::verify_otp_and_reset_password),
        )
        .route("/api/admin/stats", get(handlers::admin_stats))
        // Products
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        // Orders
        .route("/api/orders", get(handlers::list_orders))
        .route(
            "/api/orders/{id}",
            get(handlers::get_order).delete(handlers::delete_order),
        )
        .route("/api/orders/{id}/status", put(handlers::update_order_status))
        // Payments
        .route("/api/payments", get(handlers::list_payments))
        .route("/api/payments/{id}", get(handlers::get_payment))
        .route(
            "/api/payments/{id}/status",
            put(handlers::update_payment_status),
        )
        // Users
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/{id}", get(handlers::get_user))
        .route("/api/users/{id}/active", put(handlers::set_user_active))
        // Dashboard
        .route("/api/dashboard/stats", get(handlers::dashboard_stats))
        // Uploads
        .route("/api/upload/image", post(handlers::upload_image))
        .route(
            "/api/upload/image/{*storage_key}",
            delete(handlers::delete_image),
        )
        // Health check (intentionally unauthenticated for probes)
        .route("/health", get(handlers::health_check));

    let mut router = Router::new().merge(api_routes);

    // Serve filesystem-backed assets directly; a remote store serves its
    // own URLs.
    if let StorageConfig::Filesystem { path, .. } = &state.config.storage {
        router = router.nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(path.clone()),
        );
    }

    // Conditionally add the metrics endpoint.
    // SECURITY: when enabled, restrict this endpoint to authorized
    // Prometheus scraper IPs at the infrastructure level.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

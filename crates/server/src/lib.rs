//! HTTP API server for the backroom admin panel.
//!
//! This crate provides the HTTP control plane:
//! - Admin authentication (JWT, password reset, OTP)
//! - Product CRUD with image lifecycle management
//! - Order, payment and user management
//! - Image upload with duplicate suppression
//! - Dashboard statistics

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod mailer;
pub mod metrics;
pub mod password;
pub mod routes;
pub mod state;
pub mod upload_cache;

pub use auth::AuthenticatedUser;
pub use error::ApiError;
pub use mailer::{Mailer, TracingMailer};
pub use routes::create_router;
pub use state::AppState;
pub use upload_cache::UploadCache;

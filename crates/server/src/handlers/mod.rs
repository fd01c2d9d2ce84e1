//! HTTP request handlers.

pub mod admins;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod orders;
pub mod payments;
pub mod products;
pub mod uploads;
pub mod users;

pub use admins::*;
pub use auth::*;
pub use common::*;
pub use dashboard::*;
pub use orders::*;
pub use payments::*;
pub use products::*;
pub use uploads::*;
pub use users::*;

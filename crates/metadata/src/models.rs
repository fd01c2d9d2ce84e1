//! Database models mapping to the metadata schema.

use crate::error::MetadataResult;
use backroom_core::ImageRecord;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Products
// =============================================================================

/// Product record.
///
/// `images_json` holds the product's canonical image list as an embedded
/// JSON array of [`ImageRecord`]; it is replaced wholesale on update,
/// never merged. `colors_json` and `sizes_json` are JSON string arrays.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub material: String,
    pub colors_json: String,
    pub sizes_json: String,
    pub price: f64,
    pub mrp: f64,
    pub stock: i64,
    pub images_json: String,
    pub special_feature: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub slug: String,
    pub sku: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl ProductRow {
    /// Decode the embedded image list.
    pub fn images(&self) -> MetadataResult<Vec<ImageRecord>> {
        Ok(serde_json::from_str(&self.images_json)?)
    }

    /// Replace the embedded image list.
    pub fn set_images(&mut self, images: &[ImageRecord]) -> MetadataResult<()> {
        self.images_json = serde_json::to_string(images)?;
        Ok(())
    }

    /// Decode the color list.
    pub fn colors(&self) -> MetadataResult<Vec<String>> {
        Ok(serde_json::from_str(&self.colors_json)?)
    }

    /// Decode the size list.
    pub fn sizes(&self) -> MetadataResult<Vec<String>> {
        Ok(serde_json::from_str(&self.sizes_json)?)
    }
}

/// Filters for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive category match.
    pub category: Option<String>,
    /// Only featured products.
    pub featured_only: bool,
    /// Case-insensitive substring search over name, category, brand,
    /// description and SKU.
    pub search: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// Order record. `items_json` is an embedded JSON array of line items.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub order_id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub items_json: String,
    pub total_amount: f64,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Filters for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<String>,
    /// Case-insensitive substring search over order number, customer name
    /// and customer email.
    pub search: Option<String>,
}

// =============================================================================
// Payments
// =============================================================================

/// Payment record. `payment_ref` is the human-facing sequential
/// identifier (`PAY0001`-style).
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub payment_ref: String,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: f64,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub gateway: String,
    pub fees: f64,
    pub processed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Filters for payment listings.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub status: Option<String>,
    pub method: Option<String>,
    /// Case-insensitive substring search over payment ref and transaction id.
    pub search: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// Storefront user record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub mobile: Option<String>,
    pub is_active: bool,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

// =============================================================================
// Admins
// =============================================================================

/// Admin account record, including password-reset and OTP state.
#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub mobile: Option<String>,
    pub is_active: bool,
    pub last_login: Option<OffsetDateTime>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<OffsetDateTime>,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<OffsetDateTime>,
    pub otp_attempts: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

//! Payment repository trait.

use crate::error::MetadataResult;
use crate::models::{PaymentFilter, PaymentRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for payment records.
#[async_trait]
pub trait PaymentRepo: Send + Sync {
    /// Create a new payment.
    async fn create_payment(&self, payment: &PaymentRow) -> MetadataResult<()>;

    /// Get a payment by ID.
    async fn get_payment(&self, payment_id: Uuid) -> MetadataResult<Option<PaymentRow>>;

    /// Update a payment's status, recording `processed_at` when provided.
    /// Returns `false` when the payment is absent.
    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: &str,
        processed_at: Option<OffsetDateTime>,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<bool>;

    /// List payments newest-first with pagination.
    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        offset: i64,
        limit: i64,
    ) -> MetadataResult<Vec<PaymentRow>>;

    /// Count payments matching the filter.
    async fn count_payments(&self, filter: &PaymentFilter) -> MetadataResult<i64>;

    /// Allocate the next sequential payment reference (`PAY0001`-style).
    async fn next_payment_ref(&self) -> MetadataResult<String>;
}

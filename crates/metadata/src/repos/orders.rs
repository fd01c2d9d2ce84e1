//! Order repository trait.

use crate::error::MetadataResult;
use crate::models::{OrderFilter, OrderRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for order records.
#[async_trait]
pub trait OrderRepo: Send + Sync {
    /// Create a new order.
    async fn create_order(&self, order: &OrderRow) -> MetadataResult<()>;

    /// Get an order by ID.
    async fn get_order(&self, order_id: Uuid) -> MetadataResult<Option<OrderRow>>;

    /// Update an order's status. Returns `false` when the order is absent.
    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<bool>;

    /// Delete an order by ID. Returns `false` when nothing was deleted.
    async fn delete_order(&self, order_id: Uuid) -> MetadataResult<bool>;

    /// List orders newest-first with pagination.
    async fn list_orders(
        &self,
        filter: &OrderFilter,
        offset: i64,
        limit: i64,
    ) -> MetadataResult<Vec<OrderRow>>;

    /// Count orders matching the filter.
    async fn count_orders(&self, filter: &OrderFilter) -> MetadataResult<i64>;

    /// Most recent orders, for the dashboard.
    async fn recent_orders(&self, limit: i64) -> MetadataResult<Vec<OrderRow>>;

    /// Sum of all order totals.
    async fn total_revenue(&self) -> MetadataResult<f64>;
}

//! Product repository trait.

use crate::error::MetadataResult;
use crate::models::{ProductFilter, ProductRow};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for product records.
#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Create a new product.
    async fn create_product(&self, product: &ProductRow) -> MetadataResult<()>;

    /// Get a product by ID.
    async fn get_product(&self, product_id: Uuid) -> MetadataResult<Option<ProductRow>>;

    /// Replace an existing product wholesale.
    ///
    /// Returns `false` when no product with the given ID exists.
    async fn update_product(&self, product: &ProductRow) -> MetadataResult<bool>;

    /// Delete a product by ID. Returns `false` when nothing was deleted.
    async fn delete_product(&self, product_id: Uuid) -> MetadataResult<bool>;

    /// List products newest-first with pagination.
    async fn list_products(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> MetadataResult<Vec<ProductRow>>;

    /// Count products matching the filter.
    async fn count_products(&self, filter: &ProductFilter) -> MetadataResult<i64>;

    /// Most recently created products, for the dashboard.
    async fn latest_products(&self, limit: i64) -> MetadataResult<Vec<ProductRow>>;
}

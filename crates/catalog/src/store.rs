//! Catalog storage contract.

use async_trait::async_trait;
use common::ProductId;

use crate::error::Result;
use crate::product::{NewProduct, Product, ProductUpdate};

/// Storage contract for the product catalog.
///
/// `adjust_stock` is the only sanctioned way to change a product's stock;
/// implementations must make its check-and-apply atomic so that no caller
/// ever observes negative stock. All other mutations leave stock alone.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches a product by id.
    async fn get(&self, product_id: &ProductId) -> Result<Product>;

    /// Lists active (non-retired) products in insertion order.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Lists every product, retired ones included.
    async fn list_all(&self) -> Result<Vec<Product>>;

    /// Creates a product after validating its fields.
    ///
    /// Fails with `Conflict` if the id is already taken.
    async fn create(&self, new: NewProduct) -> Result<Product>;

    /// Applies only the supplied fields; never touches stock.
    async fn update(&self, product_id: &ProductId, update: ProductUpdate) -> Result<Product>;

    /// Atomically applies `delta` to the product's stock and returns the
    /// new value.
    ///
    /// Fails with `InsufficientStock`, leaving stock unchanged, if the
    /// result would be negative.
    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<u32>;

    /// Soft-retires a product so it no longer appears to buyers.
    async fn retire(&self, product_id: &ProductId) -> Result<Product>;
}

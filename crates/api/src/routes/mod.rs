//! Route handlers and shared application state.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use catalog::{CatalogService, CatalogStore};
use ::orders::OrderRepository as OrderRepositoryTrait;
use ::orders::OrderService;

/// Shared application state accessible from all handlers.
pub struct AppState<C: CatalogStore, R: OrderRepositoryTrait> {
    pub catalog_service: CatalogService<C>,
    pub order_service: OrderService<C, R>,
}

//! Order storage contract.

use async_trait::async_trait;
use common::OrderId;

use crate::error::Result;
use crate::model::Order;
use crate::status::OrderStatus;

/// Storage contract for orders.
///
/// Orders are immutable once written except for `status`, which is the
/// only sanctioned post-creation mutation.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order aggregate.
    ///
    /// Fails with `Conflict` if the id already exists.
    async fn create(&self, order: Order) -> Result<Order>;

    /// Fetches an order by id.
    async fn get(&self, order_id: OrderId) -> Result<Order>;

    /// Lists all orders in creation order.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Updates only the status field; items, buyer fields, and the
    /// creation timestamp are untouched.
    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order>;
}

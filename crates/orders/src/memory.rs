use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};
use crate::model::Order;
use crate::repository::OrderRepository;
use crate::status::OrderStatus;

#[derive(Default)]
struct RepositoryState {
    orders: HashMap<OrderId, Order>,
    // Creation order, for stable listings.
    order: Vec<OrderId>,
    fail_on_create: bool,
}

/// In-memory order repository.
///
/// Provides the same interface as the PostgreSQL implementation, plus a
/// failure-injection hook so tests can exercise the compensating
/// stock-release path when persistence fails.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<RepositoryState>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory order repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to reject the next create calls.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut state = self.state.write().await;

        if state.fail_on_create {
            return Err(OrderError::Storage("injected write failure".to_string()));
        }

        if state.orders.contains_key(&order.id) {
            return Err(OrderError::Conflict { order_id: order.id });
        }

        state.order.push(order.id);
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        let state = self.state.read().await;
        state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(OrderError::NotFound { order_id })
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.orders.get(id))
            .cloned()
            .collect())
    }

    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound { order_id })?;
        order.status = status;
        Ok(order.clone())
    }
}

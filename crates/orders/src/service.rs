//! Order service orchestrating placement and status transitions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use catalog::{CatalogStore, InventoryGuard, Reservation};
use chrono::Utc;
use common::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::model::{Order, OrderItem};
use crate::repository::OrderRepository;
use crate::status::OrderStatus;

/// A requested order line: which product, how much.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A bulk-order placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub buyer_name: String,
    pub contact_number: String,
    pub delivery_address: String,
    pub lines: Vec<LineRequest>,
}

/// Service for placing orders and driving them through fulfillment.
///
/// Placement either reserves every line and persists the order, or
/// reserves nothing: any failure after a partial reservation releases
/// the earlier debits before the error surfaces.
pub struct OrderService<C: CatalogStore, R: OrderRepository> {
    catalog: Arc<C>,
    guard: InventoryGuard<C>,
    repository: R,
}

impl<C: CatalogStore, R: OrderRepository> OrderService<C, R> {
    /// Creates a new order service over the given catalog and repository.
    pub fn new(catalog: Arc<C>, repository: R) -> Self {
        let guard = InventoryGuard::new(catalog.clone());
        Self::from_parts(catalog, guard, repository)
    }

    /// Creates a service with an externally configured guard.
    pub fn from_parts(catalog: Arc<C>, guard: InventoryGuard<C>, repository: R) -> Self {
        Self {
            catalog,
            guard,
            repository,
        }
    }

    /// Places a bulk order.
    ///
    /// Validates the request, reserves stock for every line (acquiring
    /// products in ascending id order so overlapping orders cannot
    /// deadlock), snapshots each line's unit price, and persists the
    /// order with status `PENDING`. No partial inventory debit survives
    /// a failure.
    #[tracing::instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order> {
        let start = std::time::Instant::now();
        metrics::counter!("orders_placement_attempts_total").increment(1);

        let result = self.place_order_inner(request).await;
        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                metrics::histogram!("order_placement_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %order.id,
                    total_cents = order.total().cents(),
                    "order placed"
                );
            }
            Err(e) => {
                metrics::counter!("orders_rejected_total").increment(1);
                tracing::info!(error = %e, "order rejected");
            }
        }
        result
    }

    async fn place_order_inner(&self, request: PlaceOrder) -> Result<Order> {
        validate_request(&request)?;

        // Coalesce duplicate product lines; the BTreeMap gives the fixed
        // global acquisition order (ascending product id).
        let mut quantities: BTreeMap<ProductId, u32> = BTreeMap::new();
        let mut appearance: Vec<ProductId> = Vec::new();
        for line in &request.lines {
            let entry = quantities.entry(line.product_id.clone()).or_insert(0);
            if *entry == 0 {
                appearance.push(line.product_id.clone());
            }
            *entry += line.quantity;
        }

        let mut reservations: Vec<Reservation> = Vec::with_capacity(quantities.len());
        let mut snapshots: HashMap<ProductId, (String, common::Money)> = HashMap::new();

        for (product_id, &quantity) in &quantities {
            let outcome = self.reserve_line(product_id, quantity).await;
            match outcome {
                Ok((reservation, name, price)) => {
                    snapshots.insert(product_id.clone(), (name, price));
                    reservations.push(reservation);
                }
                Err(e) => {
                    self.release_all(reservations).await;
                    return Err(e);
                }
            }
        }

        let items = appearance
            .iter()
            .map(|product_id| {
                let (name, price) = snapshots[product_id].clone();
                OrderItem::new(product_id.clone(), name, quantities[product_id], price)
            })
            .collect();

        let order = Order {
            id: OrderId::new(),
            buyer_name: request.buyer_name,
            contact_number: request.contact_number,
            delivery_address: request.delivery_address,
            status: OrderStatus::Pending,
            items,
            created_at: Utc::now(),
        };

        match self.repository.create(order).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::warn!(error = %e, "order persistence failed, releasing reservations");
                self.release_all(reservations).await;
                Err(e)
            }
        }
    }

    async fn reserve_line(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(Reservation, String, common::Money)> {
        let product = self.catalog.get(product_id).await?;
        if product.retired {
            return Err(OrderError::ProductRetired {
                product_id: product_id.to_string(),
            });
        }

        let reservation = self.guard.reserve(product_id, quantity).await?;
        Ok((reservation, product.name, product.price))
    }

    /// Releases reservations in reverse acquisition order. Best effort:
    /// a failed release is logged, the rest still run.
    async fn release_all(&self, mut reservations: Vec<Reservation>) {
        while let Some(reservation) = reservations.pop() {
            let product_id = reservation.product_id().clone();
            if let Err(e) = self.guard.release(reservation).await {
                tracing::error!(%product_id, error = %e, "failed to release reservation");
            }
        }
    }

    /// Moves an order to a new status after the state machine approves.
    ///
    /// Re-requesting the current status is an idempotent success with no
    /// write.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        requested: OrderStatus,
    ) -> Result<Order> {
        let order = self.repository.get(order_id).await?;

        if order.status == requested {
            return Ok(order);
        }

        OrderStatus::validate(order.status, requested)?;
        let updated = self.repository.update_status(order_id, requested).await?;

        metrics::counter!("order_status_updates_total").increment(1);
        tracing::info!(%order_id, from = %order.status, to = %requested, "order status updated");
        Ok(updated)
    }

    /// Cancels an order and puts its stock back.
    ///
    /// Only `PENDING` and `IN_PROGRESS` orders can be cancelled;
    /// cancelling an already-cancelled order is an idempotent success.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let order = self.repository.get(order_id).await?;

        if order.status == OrderStatus::Cancelled {
            return Ok(order);
        }

        OrderStatus::validate(order.status, OrderStatus::Cancelled)?;

        for item in &order.items {
            if let Err(e) = self.guard.restore(&item.product_id, item.quantity).await {
                // The product may have been retired; its stock row still
                // exists, so only storage-level failures land here.
                tracing::error!(
                    %order_id,
                    product_id = %item.product_id,
                    error = %e,
                    "failed to restore stock during cancellation"
                );
            }
        }

        let cancelled = self
            .repository
            .update_status(order_id, OrderStatus::Cancelled)
            .await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled");
        Ok(cancelled)
    }

    /// Loads an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.repository.get(order_id).await
    }

    /// Lists all orders.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.repository.list().await
    }
}

fn validate_request(request: &PlaceOrder) -> Result<()> {
    if request.buyer_name.trim().is_empty() {
        return Err(OrderError::MissingField {
            field: "buyer_name",
        });
    }
    if request.contact_number.trim().is_empty() {
        return Err(OrderError::MissingField {
            field: "contact_number",
        });
    }
    if request.delivery_address.trim().is_empty() {
        return Err(OrderError::MissingField {
            field: "delivery_address",
        });
    }
    if request.lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    for line in &request.lines {
        if line.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                product_id: line.product_id.to_string(),
                quantity: line.quantity,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryOrderRepository;
    use catalog::{CatalogError, InMemoryCatalogStore, NewProduct, ProductUpdate, seed_catalog};
    use common::Money;

    async fn setup() -> (
        OrderService<InMemoryCatalogStore, InMemoryOrderRepository>,
        Arc<InMemoryCatalogStore>,
        InMemoryOrderRepository,
    ) {
        let store = Arc::new(InMemoryCatalogStore::new());
        seed_catalog(store.as_ref()).await.unwrap();
        let repository = InMemoryOrderRepository::new();
        let service = OrderService::new(store.clone(), repository.clone());
        (service, store, repository)
    }

    fn request(lines: Vec<LineRequest>) -> PlaceOrder {
        PlaceOrder {
            buyer_name: "Ada Lovelace".to_string(),
            contact_number: "555-0100".to_string(),
            delivery_address: "12 Analytical Way".to_string(),
            lines,
        }
    }

    fn line(product_id: &str, quantity: u32) -> LineRequest {
        LineRequest {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[tokio::test]
    async fn place_order_snapshots_price_and_decrements_stock() {
        let (service, store, _) = setup().await;

        let order = service
            .place_order(request(vec![line("1", 10)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 10);
        assert_eq!(order.items[0].unit_price.cents(), 299);
        assert_eq!(order.items[0].line_total().cents(), 2990);
        assert_eq!(order.total().cents(), 2990);

        let product = store.get(&ProductId::new("1")).await.unwrap();
        assert_eq!(product.stock, 490);
    }

    #[tokio::test]
    async fn place_order_multi_item_totals_and_stock() {
        let (service, store, _) = setup().await;

        let order = service
            .place_order(request(vec![line("2", 5), line("1", 10)]))
            .await
            .unwrap();

        // Items keep request order even though reservation runs sorted.
        assert_eq!(order.items[0].product_id.as_str(), "2");
        assert_eq!(order.items[1].product_id.as_str(), "1");
        assert_eq!(order.total().cents(), 5 * 199 + 10 * 299);

        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 490);
        assert_eq!(store.get(&ProductId::new("2")).await.unwrap().stock, 995);
    }

    #[tokio::test]
    async fn duplicate_lines_are_coalesced() {
        let (service, store, _) = setup().await;

        let order = service
            .place_order(request(vec![line("1", 3), line("1", 7)]))
            .await
            .unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 10);
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 490);
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let (service, _, _) = setup().await;
        let result = service.place_order(request(vec![])).await;
        assert!(matches!(result, Err(OrderError::EmptyOrder)));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (service, store, _) = setup().await;
        let result = service
            .place_order(request(vec![line("1", 0)]))
            .await;
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 500);
    }

    #[tokio::test]
    async fn blank_buyer_name_is_rejected() {
        let (service, _, _) = setup().await;
        let mut req = request(vec![line("1", 1)]);
        req.buyer_name = "  ".to_string();
        let result = service.place_order(req).await;
        assert!(matches!(
            result,
            Err(OrderError::MissingField {
                field: "buyer_name"
            })
        ));
    }

    #[tokio::test]
    async fn unknown_product_is_rejected() {
        let (service, _, repository) = setup().await;
        let result = service.place_order(request(vec![line("999", 1)])).await;
        assert!(matches!(
            result,
            Err(OrderError::Catalog(CatalogError::NotFound { .. }))
        ));
        assert_eq!(repository.order_count().await, 0);
    }

    #[tokio::test]
    async fn retired_product_is_not_orderable() {
        let (service, store, _) = setup().await;
        store.retire(&ProductId::new("1")).await.unwrap();

        let result = service.place_order(request(vec![line("1", 1)])).await;
        assert!(matches!(result, Err(OrderError::ProductRetired { .. })));
    }

    #[tokio::test]
    async fn failed_second_line_releases_first_reservation() {
        let (service, store, repository) = setup().await;

        // Product "10" has 150 in stock; asking for 200 must fail after
        // product "1" was already reserved.
        let result = service
            .place_order(request(vec![line("1", 10), line("10", 200)]))
            .await;

        assert!(matches!(
            result,
            Err(OrderError::Catalog(CatalogError::InsufficientStock { .. }))
        ));
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 500);
        assert_eq!(store.get(&ProductId::new("10")).await.unwrap().stock, 150);
        assert_eq!(repository.order_count().await, 0);
    }

    #[tokio::test]
    async fn persistence_failure_releases_all_reservations() {
        let (service, store, repository) = setup().await;
        repository.set_fail_on_create(true).await;

        let result = service
            .place_order(request(vec![line("1", 10), line("2", 5)]))
            .await;

        assert!(matches!(result, Err(OrderError::Storage(_))));
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 500);
        assert_eq!(store.get(&ProductId::new("2")).await.unwrap().stock, 1000);
        assert_eq!(repository.order_count().await, 0);
    }

    #[tokio::test]
    async fn later_price_edit_does_not_change_order_total() {
        let (service, store, _) = setup().await;

        let order = service
            .place_order(request(vec![line("1", 10)]))
            .await
            .unwrap();

        store
            .update(
                &ProductId::new("1"),
                ProductUpdate {
                    price: Some(Money::from_cents(999)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reloaded = service.get_order(order.id).await.unwrap();
        assert_eq!(reloaded.total().cents(), 2990);
    }

    #[tokio::test]
    async fn status_lifecycle_pending_in_progress_delivered() {
        let (service, _, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 1)]))
            .await
            .unwrap();

        let in_progress = service
            .update_order_status(order.id, OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(in_progress.status, OrderStatus::InProgress);

        let delivered = service
            .update_order_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn delivered_is_terminal() {
        let (service, _, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 1)]))
            .await
            .unwrap();
        service
            .update_order_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();

        let result = service
            .update_order_status(order.id, OrderStatus::InProgress)
            .await;
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn same_status_update_is_idempotent() {
        let (service, _, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 1)]))
            .await
            .unwrap();

        let unchanged = service
            .update_order_status(order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(unchanged, order);
    }

    #[tokio::test]
    async fn update_status_of_unknown_order_is_not_found() {
        let (service, _, _) = setup().await;
        let result = service
            .update_order_status(OrderId::new(), OrderStatus::InProgress)
            .await;
        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cancel_restores_stock() {
        let (service, store, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 10), line("2", 5)]))
            .await
            .unwrap();
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 490);

        let cancelled = service.cancel_order(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 500);
        assert_eq!(store.get(&ProductId::new("2")).await.unwrap().stock, 1000);
    }

    #[tokio::test]
    async fn cancel_delivered_order_is_invalid() {
        let (service, store, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 10)]))
            .await
            .unwrap();
        service
            .update_order_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();

        let result = service.cancel_order(order.id).await;
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition { .. })
        ));
        // Delivered stock stays debited.
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 490);
    }

    #[tokio::test]
    async fn cancel_twice_is_idempotent() {
        let (service, store, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 10)]))
            .await
            .unwrap();

        service.cancel_order(order.id).await.unwrap();
        let again = service.cancel_order(order.id).await.unwrap();

        assert_eq!(again.status, OrderStatus::Cancelled);
        // Stock restored exactly once.
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 500);
    }

    #[tokio::test]
    async fn list_orders_in_creation_order() {
        let (service, _, _) = setup().await;
        let first = service
            .place_order(request(vec![line("1", 1)]))
            .await
            .unwrap();
        let second = service
            .place_order(request(vec![line("2", 1)]))
            .await
            .unwrap();

        let listed = service.list_orders().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn order_can_reference_product_retired_after_placement() {
        let (service, store, _) = setup().await;
        let order = service
            .place_order(request(vec![line("1", 10)]))
            .await
            .unwrap();

        store.retire(&ProductId::new("1")).await.unwrap();

        // Historical order still reads fine and cancellation still
        // restores the retired product's stock.
        let reloaded = service.get_order(order.id).await.unwrap();
        assert_eq!(reloaded.total().cents(), 2990);

        service.cancel_order(order.id).await.unwrap();
        assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 500);
    }

    #[tokio::test]
    async fn new_product_is_orderable() {
        let (service, store, _) = setup().await;
        let created = store
            .create(NewProduct {
                id: None,
                name: "Golden Beets".to_string(),
                description: String::new(),
                category: "Vegetables".to_string(),
                unit: "kg".to_string(),
                price: Money::from_cents(349),
                stock: 40,
            })
            .await
            .unwrap();

        let order = service
            .place_order(request(vec![LineRequest {
                product_id: created.id.clone(),
                quantity: 4,
            }]))
            .await
            .unwrap();

        assert_eq!(order.total().cents(), 4 * 349);
        assert_eq!(store.get(&created.id).await.unwrap().stock, 36);
    }
}

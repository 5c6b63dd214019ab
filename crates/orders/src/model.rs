//! Order aggregate and line items.

use chrono::{DateTime, Utc};
use common::{ItemId, Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// A line item within an order.
///
/// Holds a weak reference to its product plus snapshots of the unit
/// price and display name captured at order time, so later catalog
/// edits never change historical order totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique line-item identifier.
    pub id: ItemId,

    /// The product ordered (lookup only, not ownership).
    pub product_id: ProductId,

    /// Product name as it read at order time.
    pub product_name: String,

    /// Quantity ordered, always positive.
    pub quantity: u32,

    /// Price per unit at order time.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new line item with a fresh id.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            id: ItemId::new(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the line total (quantity * unit price snapshot).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order aggregate.
///
/// Buyer fields and items are fixed at creation; `status` is the only
/// field mutated afterwards, and only through validated transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier, assigned at creation.
    pub id: OrderId,

    /// Buyer's name as entered on the order form.
    pub buyer_name: String,

    /// Buyer's contact number.
    pub contact_number: String,

    /// Delivery address.
    pub delivery_address: String,

    /// Current fulfillment status.
    pub status: OrderStatus,

    /// Line items, in the order they were requested.
    pub items: Vec<OrderItem>,

    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total, recomputed from line snapshots on every
    /// read rather than stored.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

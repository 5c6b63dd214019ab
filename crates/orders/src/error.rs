//! Order error types.

use catalog::CatalogError;
use common::OrderId;
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order must contain at least one line.
    #[error("Order has no items")]
    EmptyOrder,

    /// Line quantity must be positive.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: String, quantity: u32 },

    /// A required buyer field is missing or blank.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// The product cannot be ordered: it has been retired from sale.
    #[error("Product not available: {product_id}")]
    ProductRetired { product_id: String },

    /// A catalog error: product not found, insufficient stock, or a
    /// reservation timeout.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order not found.
    #[error("Order not found: {order_id}")]
    NotFound { order_id: OrderId },

    /// The requested status change is not permitted.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The status string is not one of the wire literals.
    #[error("Unknown order status: {status}")]
    UnknownStatus { status: String },

    /// An order with this ID already exists.
    #[error("Order already exists: {order_id}")]
    Conflict { order_id: OrderId },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The storage layer rejected the write.
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Result type for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;

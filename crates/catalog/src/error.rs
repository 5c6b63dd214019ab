//! Catalog error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product does not exist (or has been retired from sale).
    #[error("Product not found: {product_id}")]
    NotFound { product_id: ProductId },

    /// The requested quantity exceeds what is currently in stock.
    /// Stock is left unchanged.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A field failed validation.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A product with this ID already exists.
    #[error("Product already exists: {product_id}")]
    Conflict { product_id: ProductId },

    /// Waiting for the product's reservation lock exceeded the bound.
    #[error("Timed out waiting to reserve product {product_id}")]
    LockTimeout { product_id: ProductId },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

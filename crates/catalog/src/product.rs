//! Product model and validation.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// A catalog product.
///
/// `stock` is mutated only through [`CatalogStore::adjust_stock`]; admin
/// edits go through [`CatalogStore::update`] and never touch it. Products
/// referenced by existing orders are soft-retired rather than deleted so
/// historical order data stays intact.
///
/// [`CatalogStore::adjust_stock`]: crate::CatalogStore::adjust_stock
/// [`CatalogStore::update`]: crate::CatalogStore::update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier, immutable after creation.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Longer display description.
    pub description: String,

    /// Classification, e.g. "Vegetables".
    pub category: String,

    /// Sale unit, e.g. "kg" or "bunch".
    pub unit: String,

    /// Price per unit.
    pub price: Money,

    /// Quantity available, never negative.
    pub stock: u32,

    /// Retired products are hidden from buyers and cannot be ordered.
    pub retired: bool,
}

impl Product {
    /// Applies an admin update, leaving `id`, `stock`, and `retired` alone.
    pub fn apply_update(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    /// Explicit id; a fresh one is generated when absent.
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub price: Money,
    pub stock: u32,
}

impl NewProduct {
    /// Validates creation fields: non-empty name, non-negative price.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.price.is_negative() {
            return Err(CatalogError::Validation {
                field: "price",
                reason: format!("must not be negative, got {}", self.price.cents()),
            });
        }
        Ok(())
    }

    /// Builds the product, assigning an id if none was supplied.
    pub fn into_product(self) -> Product {
        Product {
            id: self.id.unwrap_or_else(ProductId::generate),
            name: self.name,
            description: self.description,
            category: self.category,
            unit: self.unit,
            price: self.price,
            stock: self.stock,
            retired: false,
        }
    }
}

/// Partial fields for an admin product update.
///
/// Stock is deliberately absent: stock changes only through order
/// placement and cancellation flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Money>,
}

impl ProductUpdate {
    /// Validates supplied fields with the same rules as creation.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name
            && name.trim().is_empty()
        {
            return Err(CatalogError::Validation {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(price) = self.price
            && price.is_negative()
        {
            return Err(CatalogError::Validation {
                field: "price",
                reason: format!("must not be negative, got {}", price.cents()),
            });
        }
        Ok(())
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use tokio::sync::RwLock;

use crate::error::{CatalogError, Result};
use crate::product::{NewProduct, Product, ProductUpdate};
use crate::store::CatalogStore;

#[derive(Default)]
struct CatalogState {
    products: HashMap<ProductId, Product>,
    // Insertion order, for stable listings.
    order: Vec<ProductId>,
}

/// In-memory catalog store.
///
/// Provides the same interface as the PostgreSQL implementation; stock
/// adjustments are atomic because the whole check-and-apply runs under
/// the write lock.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory catalog store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of products stored, retired ones included.
    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, product_id: &ProductId) -> Result<Product> {
        let state = self.state.read().await;
        state
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                product_id: product_id.clone(),
            })
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.products.get(id))
            .filter(|p| !p.retired)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.products.get(id))
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        new.validate()?;
        let product = new.into_product();

        let mut state = self.state.write().await;
        if state.products.contains_key(&product.id) {
            return Err(CatalogError::Conflict {
                product_id: product.id.clone(),
            });
        }
        state.order.push(product.id.clone());
        state.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update(&self, product_id: &ProductId, update: ProductUpdate) -> Result<Product> {
        update.validate()?;

        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(product_id)
            .ok_or_else(|| CatalogError::NotFound {
                product_id: product_id.clone(),
            })?;
        product.apply_update(update);
        Ok(product.clone())
    }

    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<u32> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(product_id)
            .ok_or_else(|| CatalogError::NotFound {
                product_id: product_id.clone(),
            })?;

        let new_stock = product.stock as i64 + delta;
        if new_stock < 0 {
            return Err(CatalogError::InsufficientStock {
                product_id: product_id.clone(),
                requested: delta.unsigned_abs() as u32,
                available: product.stock,
            });
        }

        product.stock = new_stock as u32;
        Ok(product.stock)
    }

    async fn retire(&self, product_id: &ProductId) -> Result<Product> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(product_id)
            .ok_or_else(|| CatalogError::NotFound {
                product_id: product_id.clone(),
            })?;
        product.retired = true;
        Ok(product.clone())
    }
}

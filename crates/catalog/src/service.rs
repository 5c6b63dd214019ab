//! Catalog service for admin and browsing callers.

use std::sync::Arc;

use common::ProductId;

use crate::error::Result;
use crate::product::{NewProduct, Product, ProductUpdate};
use crate::store::CatalogStore;

/// Thin facade over the catalog store for product CRUD.
///
/// Deliberately does not expose stock mutation: stock changes only
/// through order placement and cancellation flows.
pub struct CatalogService<C: CatalogStore> {
    store: Arc<C>,
}

impl<C: CatalogStore> Clone for CatalogService<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<C: CatalogStore> CatalogService<C> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Lists products available to buyers.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.store.list().await
    }

    /// Lists every product, retired ones included (admin view).
    #[tracing::instrument(skip(self))]
    pub async fn list_all_products(&self) -> Result<Vec<Product>> {
        self.store.list_all().await
    }

    /// Fetches a single product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product> {
        self.store.get(product_id).await
    }

    /// Creates a product.
    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let product = self.store.create(new).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Updates a product's display fields and price.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product> {
        self.store.update(product_id, update).await
    }

    /// Soft-retires a product.
    #[tracing::instrument(skip(self))]
    pub async fn retire_product(&self, product_id: &ProductId) -> Result<Product> {
        let product = self.store.retire(product_id).await?;
        tracing::info!(product_id = %product.id, "product retired");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::memory::InMemoryCatalogStore;
    use common::Money;

    fn service() -> CatalogService<InMemoryCatalogStore> {
        CatalogService::new(Arc::new(InMemoryCatalogStore::new()))
    }

    fn spinach() -> NewProduct {
        NewProduct {
            id: None,
            name: "Fresh Spinach".to_string(),
            description: "Organic baby spinach leaves".to_string(),
            category: "Vegetables".to_string(),
            unit: "kg".to_string(),
            price: Money::from_cents(399),
            stock: 300,
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let service = service();
        let created = service.create_product(spinach()).await.unwrap();

        let listed = service.list_products().await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() {
        let service = service();
        let mut bad = spinach();
        bad.name = String::new();
        assert!(matches!(
            service.create_product(bad).await,
            Err(CatalogError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn update_changes_price_only_where_asked() {
        let service = service();
        let created = service.create_product(spinach()).await.unwrap();

        let updated = service
            .update_product(
                &created.id,
                ProductUpdate {
                    price: Some(Money::from_cents(449)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price.cents(), 449);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.stock, created.stock);
    }

    #[tokio::test]
    async fn retired_product_leaves_buyer_listing() {
        let service = service();
        let created = service.create_product(spinach()).await.unwrap();

        service.retire_product(&created.id).await.unwrap();

        assert!(service.list_products().await.unwrap().is_empty());
        assert_eq!(service.list_all_products().await.unwrap().len(), 1);
    }
}

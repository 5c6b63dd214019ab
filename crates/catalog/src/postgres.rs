use async_trait::async_trait;
use common::{Money, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{CatalogError, Result};
use crate::product::{NewProduct, Product, ProductUpdate};
use crate::store::CatalogStore;

/// PostgreSQL-backed catalog store.
///
/// Stock adjustment is a single conditional `UPDATE`, so the database
/// enforces the non-negative invariant without a read-then-write window.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            unit: row.try_get("unit")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get::<i64, _>("stock")? as u32,
            retired: row.try_get("retired")?,
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn get(&self, product_id: &ProductId) -> Result<Product> {
        let row = sqlx::query(
            "SELECT id, name, description, category, unit, price_cents, stock, retired
             FROM products WHERE id = $1",
        )
        .bind(product_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound {
            product_id: product_id.clone(),
        })?;

        Self::row_to_product(&row)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, description, category, unit, price_cents, stock, retired
             FROM products WHERE NOT retired ORDER BY pos",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, description, category, unit, price_cents, stock, retired
             FROM products ORDER BY pos",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        new.validate()?;
        let product = new.into_product();

        sqlx::query(
            "INSERT INTO products (id, name, description, category, unit, price_cents, stock, retired)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price.cents())
        .bind(product.stock as i64)
        .bind(product.retired)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return CatalogError::Conflict {
                    product_id: product.id.clone(),
                };
            }
            CatalogError::Database(e)
        })?;

        Ok(product)
    }

    async fn update(&self, product_id: &ProductId, update: ProductUpdate) -> Result<Product> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, name, description, category, unit, price_cents, stock, retired
             FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CatalogError::NotFound {
            product_id: product_id.clone(),
        })?;

        let mut product = Self::row_to_product(&row)?;
        product.apply_update(update);

        // Stock deliberately absent from the statement.
        sqlx::query(
            "UPDATE products SET name = $2, description = $3, category = $4, unit = $5, price_cents = $6
             WHERE id = $1",
        )
        .bind(product_id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price.cents())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<u32> {
        let new_stock: Option<i64> = sqlx::query_scalar(
            "UPDATE products SET stock = stock + $2
             WHERE id = $1 AND stock + $2 >= 0
             RETURNING stock",
        )
        .bind(product_id.as_str())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stock) = new_stock {
            return Ok(stock as u32);
        }

        // Nothing updated: distinguish a missing product from an overdraw.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                .bind(product_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match available {
            Some(available) => Err(CatalogError::InsufficientStock {
                product_id: product_id.clone(),
                requested: delta.unsigned_abs() as u32,
                available: available as u32,
            }),
            None => Err(CatalogError::NotFound {
                product_id: product_id.clone(),
            }),
        }
    }

    async fn retire(&self, product_id: &ProductId) -> Result<Product> {
        let row = sqlx::query(
            "UPDATE products SET retired = TRUE WHERE id = $1
             RETURNING id, name, description, category, unit, price_cents, stock, retired",
        )
        .bind(product_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound {
            product_id: product_id.clone(),
        })?;

        Self::row_to_product(&row)
    }
}

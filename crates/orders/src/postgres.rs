use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ItemId, Money, OrderId, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{OrderError, Result};
use crate::model::{Order, OrderItem};
use crate::repository::OrderRepository;
use crate::status::OrderStatus;

/// PostgreSQL-backed order repository.
///
/// An order and its line items are written in one transaction; the
/// aggregate is never partially visible.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            buyer_name: row.try_get("buyer_name")?,
            contact_number: row.try_get("contact_number")?,
            delivery_address: row.try_get("delivery_address")?,
            status: status.parse::<OrderStatus>()?,
            items,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: row.try_get::<i64, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            "SELECT id, product_id, product_name, quantity, unit_price_cents
             FROM order_items WHERE order_id = $1 ORDER BY line_no",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, buyer_name, contact_number, delivery_address, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order.id.as_uuid())
        .bind(&order.buyer_name)
        .bind(&order.contact_number)
        .bind(&order.delivery_address)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return OrderError::Conflict { order_id: order.id };
            }
            OrderError::Database(e)
        })?;

        for (line_no, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price_cents, line_no)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(item.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(item.product_id.as_str())
            .bind(&item.product_name)
            .bind(item.quantity as i64)
            .bind(item.unit_price.cents())
            .bind(line_no as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        let row = sqlx::query(
            "SELECT id, buyer_name, contact_number, delivery_address, status, created_at
             FROM orders WHERE id = $1",
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound { order_id })?;

        let items = self.items_for(order_id).await?;
        Self::row_to_order(&row, items)
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let order_rows = sqlx::query(
            "SELECT id, buyer_name, contact_number, delivery_address, status, created_at
             FROM orders ORDER BY pos",
        )
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price_cents
             FROM order_items ORDER BY line_no",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let order_id: Uuid = row.try_get("order_id")?;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }

        order_rows
            .iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                let items = items_by_order.remove(&id).unwrap_or_default();
                Self::row_to_order(row, items)
            })
            .collect()
    }

    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound { order_id });
        }

        self.get(order_id).await
    }
}

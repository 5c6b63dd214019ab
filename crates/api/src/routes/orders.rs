//! Order placement, tracking, and admin status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::CatalogStore;
use common::{OrderId, ProductId};
use orders::{LineRequest, Order, OrderRepository, OrderStatus, PlaceOrder};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub buyer_name: String,
    pub contact_number: String,
    pub delivery_address: String,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub buyer_name: String,
    pub contact_number: String,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub total_display: String,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let total = order.total();
        Self {
            id: order.id.to_string(),
            buyer_name: order.buyer_name,
            contact_number: order.contact_number,
            delivery_address: order.delivery_address,
            status: order.status,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id.to_string(),
                    product_id: item.product_id.to_string(),
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                    line_total_cents: item.line_total().cents(),
                })
                .collect(),
            total_cents: total.cents(),
            total_display: total.to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /orders — place a bulk order.
#[tracing::instrument(skip(state, req))]
pub async fn place<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let request = PlaceOrder {
        buyer_name: req.buyer_name,
        contact_number: req.contact_number,
        delivery_address: req.delivery_address,
        lines: req
            .items
            .into_iter()
            .map(|line| LineRequest {
                product_id: ProductId::new(line.product_id),
                quantity: line.quantity,
            })
            .collect(),
    };

    let order = state.order_service.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/:id — fetch an order for tracking.
#[tracing::instrument(skip(state))]
pub async fn get<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.get_order(order_id).await?;
    Ok(Json(order.into()))
}

/// GET /orders — list all orders (admin view).
#[tracing::instrument(skip(state))]
pub async fn list<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.order_service.list_orders().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// PATCH /orders/:id/status — advance an order through fulfillment.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status: OrderStatus = req.status.parse().map_err(ApiError::Order)?;

    let order = state
        .order_service
        .update_order_status(order_id, status)
        .await?;
    Ok(Json(order.into()))
}

/// POST /orders/:id/cancel — cancel an order and restore its stock.
#[tracing::instrument(skip(state))]
pub async fn cancel<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.cancel_order(order_id).await?;
    Ok(Json(order.into()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID format: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

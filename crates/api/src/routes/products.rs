//! Catalog browsing and admin product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::{CatalogStore, NewProduct, Product, ProductUpdate};
use common::{Money, ProductId};
use orders::OrderRepository;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: u32,
}

// Produce sells by the kilogram unless the admin says otherwise.
fn default_unit() -> String {
    "kg".to_string()
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub price_cents: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub price_cents: i64,
    pub price_display: String,
    pub stock: u32,
    pub retired: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            category: product.category,
            unit: product.unit,
            price_cents: product.price.cents(),
            price_display: product.price.to_string(),
            stock: product.stock,
            retired: product.retired,
        }
    }
}

// -- Handlers --

/// GET /products — list products available to buyers.
#[tracing::instrument(skip(state))]
pub async fn list<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog_service.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/all — list every product, retired ones included.
#[tracing::instrument(skip(state))]
pub async fn list_all<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog_service.list_all_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/:id — fetch a single product.
#[tracing::instrument(skip(state))]
pub async fn get<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog_service
        .get_product(&ProductId::new(id))
        .await?;
    Ok(Json(product.into()))
}

/// POST /products — create a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let new = NewProduct {
        id: req.id.map(ProductId::new),
        name: req.name,
        description: req.description,
        category: req.category,
        unit: req.unit,
        price: Money::from_cents(req.price_cents),
        stock: req.stock,
    };

    let product = state.catalog_service.create_product(new).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PATCH /products/:id — update display fields and price.
#[tracing::instrument(skip(state, req))]
pub async fn update<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let update = ProductUpdate {
        name: req.name,
        description: req.description,
        category: req.category,
        unit: req.unit,
        price: req.price_cents.map(Money::from_cents),
    };

    let product = state
        .catalog_service
        .update_product(&ProductId::new(id), update)
        .await?;
    Ok(Json(product.into()))
}

/// POST /products/:id/retire — soft-retire a product.
#[tracing::instrument(skip(state))]
pub async fn retire<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<C, R>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog_service
        .retire_product(&ProductId::new(id))
        .await?;
    Ok(Json(product.into()))
}

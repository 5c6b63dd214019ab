//! HTTP API server for the produce market.
//!
//! Exposes the catalog and order engine over REST with structured
//! logging (tracing) and Prometheus metrics. The transport layer maps
//! typed errors to status codes and stays out of the core's way.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use catalog::{CatalogService, CatalogStore, InMemoryCatalogStore, seed_catalog};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderRepository, OrderRepository, OrderService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C: CatalogStore + 'static, R: OrderRepository + 'static>(
    state: Arc<AppState<C, R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<C, R>))
        .route("/products", post(routes::products::create::<C, R>))
        .route("/products/all", get(routes::products::list_all::<C, R>))
        .route("/products/{id}", get(routes::products::get::<C, R>))
        .route("/products/{id}", patch(routes::products::update::<C, R>))
        .route(
            "/products/{id}/retire",
            post(routes::products::retire::<C, R>),
        )
        .route("/orders", post(routes::orders::place::<C, R>))
        .route("/orders", get(routes::orders::list::<C, R>))
        .route("/orders/{id}", get(routes::orders::get::<C, R>))
        .route(
            "/orders/{id}/status",
            patch(routes::orders::update_status::<C, R>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<C, R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds application state over the given catalog store and order
/// repository.
pub fn create_state<C: CatalogStore, R: OrderRepository>(
    catalog_store: Arc<C>,
    repository: R,
) -> Arc<AppState<C, R>> {
    let catalog_service = CatalogService::new(catalog_store.clone());
    let order_service = OrderService::new(catalog_store, repository);

    Arc::new(AppState {
        catalog_service,
        order_service,
    })
}

/// Builds in-memory application state pre-loaded with the seed catalog.
pub async fn create_seeded_state()
-> Result<Arc<AppState<InMemoryCatalogStore, InMemoryOrderRepository>>, catalog::CatalogError> {
    let catalog_store = Arc::new(InMemoryCatalogStore::new());
    seed_catalog(catalog_store.as_ref()).await?;
    Ok(create_state(catalog_store, InMemoryOrderRepository::new()))
}

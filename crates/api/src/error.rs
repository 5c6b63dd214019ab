//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use orders::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Catalog operation error.
    Catalog(CatalogError),
    /// Order operation error.
    Order(OrderError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        CatalogError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::InsufficientStock { .. } | CatalogError::Conflict { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CatalogError::LockTimeout { .. } => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        CatalogError::Database(_) | CatalogError::Migration(_) => {
            tracing::error!(error = %err, "catalog storage error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match err {
        OrderError::EmptyOrder
        | OrderError::InvalidQuantity { .. }
        | OrderError::MissingField { .. }
        | OrderError::UnknownStatus { .. }
        | OrderError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::NotFound { .. } | OrderError::ProductRetired { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        OrderError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
        OrderError::Catalog(inner) => catalog_error_to_response(inner),
        OrderError::Database(_) | OrderError::Storage(_) => {
            tracing::error!(error = %err, "order storage error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

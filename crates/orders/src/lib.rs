//! Order placement and fulfillment engine.
//!
//! This crate provides:
//! - The `Order`/`OrderItem` model with order-time price snapshots
//! - The `OrderStatus` state machine gating every status write
//! - The `OrderRepository` storage contract with in-memory and PostgreSQL
//!   implementations
//! - The `OrderService` orchestrating placement (validate, reserve stock,
//!   snapshot prices, persist) and status transitions

mod error;
mod memory;
mod model;
mod postgres;
mod repository;
mod service;
mod status;

pub use error::{OrderError, Result};
pub use memory::InMemoryOrderRepository;
pub use model::{Order, OrderItem};
pub use postgres::PostgresOrderRepository;
pub use repository::OrderRepository;
pub use service::{LineRequest, OrderService, PlaceOrder};
pub use status::OrderStatus;

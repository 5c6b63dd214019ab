//! Shared types for the produce market.
//!
//! Identifier newtypes and the `Money` value type used by the catalog,
//! orders, and api crates.

mod types;

pub use types::{ItemId, Money, OrderId, ProductId};

//! Order status state machine.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// The status of an order in its fulfillment lifecycle.
///
/// Transitions:
/// ```text
/// Pending ──┬──► InProgress ──► Delivered
///           │        │
///           ├────────┴──► Cancelled
///           └──► Delivered
/// ```
///
/// `Delivered` and `Cancelled` are terminal. Re-setting a status to its
/// current value is an idempotent no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order accepted, awaiting fulfillment.
    #[default]
    Pending,

    /// Order is being prepared for delivery.
    InProgress,

    /// Order has been delivered (terminal).
    Delivered,

    /// Order was cancelled and its stock released (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if the machine permits moving to `next`.
    ///
    /// Same-status is permitted (idempotent re-set).
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::InProgress)
                | (OrderStatus::Pending, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::InProgress, OrderStatus::Delivered)
                | (OrderStatus::InProgress, OrderStatus::Cancelled)
        )
    }

    /// Validates a requested transition.
    ///
    /// Pure function, no side effects; consulted before every status
    /// write.
    pub fn validate(current: OrderStatus, requested: OrderStatus) -> Result<(), OrderError> {
        if current.can_transition_to(requested) {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                from: current,
                to: requested,
            })
        }
    }

    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "IN_PROGRESS" => Ok(OrderStatus::InProgress),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(OrderError::UnknownStatus {
                status: other.to_string(),
            }),
        }
    }
}

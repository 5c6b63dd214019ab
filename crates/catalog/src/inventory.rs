//! Per-product serialization of stock reservations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use common::ProductId;
use tokio::sync::Mutex;

use crate::error::{CatalogError, Result};
use crate::store::CatalogStore;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// A successful atomic stock decrement.
///
/// Holding a `Reservation` proves the stock was debited by exactly
/// `quantity`; pass it back to [`InventoryGuard::release`] to undo the
/// debit on downstream failure or order cancellation. The token is
/// consumed on release, so a reservation cannot be released twice.
#[derive(Debug)]
pub struct Reservation {
    product_id: ProductId,
    quantity: u32,
}

impl Reservation {
    /// The reserved product.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// The reserved quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Serializes stock check-and-decrement per product.
///
/// Two concurrent reservations for the same product are totally ordered:
/// each runs its `adjust_stock` under that product's async mutex, so
/// neither can act on a stale stock reading. Reservations for different
/// products proceed in parallel. Lock waits are bounded; a caller that
/// cannot acquire the product's lock in time gets `LockTimeout` rather
/// than hanging.
pub struct InventoryGuard<C> {
    store: Arc<C>,
    locks: Arc<StdMutex<HashMap<ProductId, Arc<Mutex<()>>>>>,
    lock_timeout: Duration,
}

impl<C> Clone for InventoryGuard<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            locks: self.locks.clone(),
            lock_timeout: self.lock_timeout,
        }
    }
}

impl<C: CatalogStore> InventoryGuard<C> {
    /// Creates a guard over the given catalog store.
    pub fn new(store: Arc<C>) -> Self {
        Self {
            store,
            locks: Arc::new(StdMutex::new(HashMap::new())),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Overrides the bounded lock wait (mainly for tests).
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    fn product_lock(&self, product_id: &ProductId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(product_id.clone()).or_default().clone()
    }

    /// Atomically reserves `quantity` units of a product.
    ///
    /// On success the stock has been decremented by exactly `quantity`
    /// and no concurrent reservation observed the pre-decrement value.
    /// Exactly one of two simultaneous requests for the last unit wins;
    /// the other receives `InsufficientStock`.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<Reservation> {
        if quantity == 0 {
            return Err(CatalogError::Validation {
                field: "quantity",
                reason: "must be greater than 0".to_string(),
            });
        }

        let lock = self.product_lock(product_id);
        let _held = tokio::time::timeout(self.lock_timeout, lock.lock())
            .await
            .map_err(|_| CatalogError::LockTimeout {
                product_id: product_id.clone(),
            })?;

        self.store
            .adjust_stock(product_id, -(quantity as i64))
            .await?;

        metrics::counter!("inventory_reservations_total").increment(1);
        Ok(Reservation {
            product_id: product_id.clone(),
            quantity,
        })
    }

    /// Restores the stock debited by a reservation, consuming the token.
    ///
    /// Used to compensate a failed multi-line order. Returns the new
    /// stock value.
    #[tracing::instrument(skip(self, reservation), fields(product_id = %reservation.product_id))]
    pub async fn release(&self, reservation: Reservation) -> Result<u32> {
        self.restore(&reservation.product_id, reservation.quantity)
            .await
    }

    /// Puts `quantity` units of a product back into stock.
    ///
    /// The serialized counterpart to [`reserve`](Self::reserve), used
    /// when a cancelled order's debit must be undone after the original
    /// reservation token is long gone.
    pub async fn restore(&self, product_id: &ProductId, quantity: u32) -> Result<u32> {
        let lock = self.product_lock(product_id);
        let _held = tokio::time::timeout(self.lock_timeout, lock.lock())
            .await
            .map_err(|_| CatalogError::LockTimeout {
                product_id: product_id.clone(),
            })?;

        let new_stock = self
            .store
            .adjust_stock(product_id, quantity as i64)
            .await?;

        metrics::counter!("inventory_releases_total").increment(1);
        Ok(new_stock)
    }
}

//! Per-order locking for the delivery registration workflow.

use std::collections::HashMap;
use std::sync::Arc;

use common::OrderId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one lock per order so that at most one delivery registration
/// for a given order runs at a time in this process. Races the lock cannot
/// see (other processes) are caught by the delivery repository's uniqueness
/// constraint on order id.
#[derive(Default)]
pub struct OrderLocks {
    locks: Mutex<HashMap<OrderId, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for an order, creating it on first use.
    ///
    /// Entries are never removed; the table grows with the number of
    /// distinct orders that ever had a registration attempt.
    pub async fn acquire(&self, order_id: OrderId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(order_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_order_is_exclusive() {
        let locks = Arc::new(OrderLocks::new());
        let order_id = OrderId::new();

        let guard = locks.acquire(order_id).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(order_id).await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_orders_do_not_contend() {
        let locks = OrderLocks::new();

        let _first = locks.acquire(OrderId::new()).await;
        let _second = locks.acquire(OrderId::new()).await;
    }

    #[tokio::test]
    async fn test_lock_is_reusable_after_release() {
        let locks = OrderLocks::new();
        let order_id = OrderId::new();

        drop(locks.acquire(order_id).await);
        drop(locks.acquire(order_id).await);
    }
}

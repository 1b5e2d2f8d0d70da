use std::{sync::Arc, time::Duration};

use log::debug;
use pqueue::{IndexedHeap, Item, ItemKey, MinFirst, Order, Result};
use tokio::sync::Mutex;

use crate::AsyncPriorityQueue;

#[derive(Debug)]
pub struct LockedQueue<V, P = i64, O = MinFirst> {
    storage: Arc<Mutex<IndexedHeap<V, P, O>>>,
}

impl<V, P, O> Clone for LockedQueue<V, P, O> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<V, P: Ord> LockedQueue<V, P> {
    pub fn new(capacity: usize) -> Self {
        Self::with_order(capacity, MinFirst)
    }
}

impl<V, P, O: Order<P>> LockedQueue<V, P, O> {
    pub fn with_order(capacity: usize, order: O) -> Self {
        Self {
            storage: Arc::new(Mutex::new(IndexedHeap::with_capacity_and_order(
                capacity, order,
            ))),
        }
    }
}

#[async_trait::async_trait]
impl<V, P, O> AsyncPriorityQueue<V, P> for LockedQueue<V, P, O>
where
    V: Clone + Send + 'static,
    P: Clone + Send + 'static,
    O: Order<P> + Send + 'static,
{
    async fn len(&self) -> usize {
        self.storage.lock().await.len()
    }

    async fn push(&self, item: Item<V, P>) -> Result<ItemKey> {
        let mut storage = self.storage.lock().await;
        Ok(storage.push(item))
    }

    async fn pop(&self) -> Result<Item<V, P>> {
        self.storage.lock().await.pop()
    }

    async fn peek(&self) -> Result<Item<V, P>> {
        self.storage.lock().await.peek().cloned()
    }

    async fn update(&self, key: ItemKey, value: V, priority: P) -> Result<()> {
        self.storage.lock().await.update(key, value, priority)
    }

    /// Tries to acquire the lock on the queue and then drains up to `n` items from it.
    /// If the lock is not acquired within the `timeout_us` period, an empty vector is returned.
    ///
    /// # Note
    /// The supplied timeout only applies to the time period that is spent waiting for the lock.
    /// It does not account for any additional time that is spent draining the queue.
    async fn drain(&self, n: usize, timeout_us: u64) -> Result<Vec<Item<V, P>>> {
        let mut drained_items = Vec::new();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_micros(timeout_us)) => {
                debug!("drain of {n} items timed out after {timeout_us} µs");
            }
            mut storage = self.storage.lock() => {
                drained_items = storage.drain(n);
            }
        }

        Ok(drained_items)
    }

    async fn validate(&self) -> Result<()> {
        Ok(self.storage.lock().await.validate()?)
    }
}

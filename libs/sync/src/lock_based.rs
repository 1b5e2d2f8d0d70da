use std::sync::{Arc, Mutex, MutexGuard};

use pqueue::{IndexedHeap, Item, ItemKey, MinFirst, Order, PriorityQueue, QueueError, Result};

/// Priority queue behind a mutex that belongs to this queue alone.
///
/// Every method holds the lock for its whole duration and nothing else. Clones share the same
/// underlying queue.
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

    fn lock(&self) -> Result<MutexGuard<'_, IndexedHeap<V, P, O>>> {
        self.storage.lock().map_err(|_| QueueError::Poisoned)
    }

    pub fn less(&self, i: usize, j: usize) -> Result<bool> {
        self.lock()?.less(i, j)
    }

    /// Exchanges two positions. Heap order is not restored.
    pub fn swap(&self, i: usize, j: usize) -> Result<()> {
        self.lock()?.swap(i, j)
    }

    pub fn contains(&self, key: ItemKey) -> Result<bool> {
        Ok(self.lock()?.contains(key))
    }

    /// Runs `f` on the next item to be popped without cloning it.
    pub fn peek_with<R>(&self, f: impl FnOnce(&Item<V, P>) -> R) -> Result<R> {
        self.lock()?.peek().map(f)
    }

    /// Runs several steps on the queue under a single lock acquisition.
    ///
    /// `f` must not call back into this queue, the lock is not reentrant.
    pub fn with_heap<R>(&self, f: impl FnOnce(&mut IndexedHeap<V, P, O>) -> R) -> Result<R> {
        let mut storage = self.lock()?;
        Ok(f(&mut storage))
    }
}

impl<V, P, O> PriorityQueue<V, P> for LockedQueue<V, P, O>
where
    V: Clone + Send + 'static,
    P: Clone + Send + 'static,
    O: Order<P> + Send + 'static,
{
    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn push(&self, item: Item<V, P>) -> Result<ItemKey> {
        Ok(self.lock()?.push(item))
    }

    fn pop(&self) -> Result<Item<V, P>> {
        self.lock()?.pop()
    }

    fn peek(&self) -> Result<Item<V, P>> {
        self.lock()?.peek().cloned()
    }

    fn update(&self, key: ItemKey, value: V, priority: P) -> Result<()> {
        self.lock()?.update(key, value, priority)
    }

    fn remove(&self, key: ItemKey) -> Result<Item<V, P>> {
        self.lock()?.remove(key)
    }

    fn drain(&self, n: usize) -> Result<Vec<Item<V, P>>> {
        Ok(self.lock()?.drain(n))
    }

    fn validate(&self) -> Result<()> {
        Ok(self.lock()?.validate()?)
    }
}

use crate::{Item, ItemKey, QueueError, Result};

/// Priority queue that can be shared between threads.
///
/// Every method is one atomic step on the queue: implementations serialize calls, either
/// behind a per-instance lock or by handing them to a single owner.
pub trait PriorityQueue<V, P = i64>: Send + Sync + 'static {
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    fn push(&self, item: Item<V, P>) -> Result<ItemKey>;

    /// Fails with [`QueueError::PreconditionFailed`] on an empty queue.
    fn pop(&self) -> Result<Item<V, P>>;

    /// Snapshot of the item that would be popped next. The queue keeps the original.
    fn peek(&self) -> Result<Item<V, P>>;

    /// Fails with [`QueueError::ItemNotInQueue`] if `key` no longer addresses a queued item.
    fn update(&self, key: ItemKey, value: V, priority: P) -> Result<()>;

    fn remove(&self, key: ItemKey) -> Result<Item<V, P>>;

    /// Pops up to `n` items in one step.
    fn drain(&self, n: usize) -> Result<Vec<Item<V, P>>>;

    /// Checks heap order and index bookkeeping of the whole queue.
    fn validate(&self) -> Result<()>;
}

/// Convenience for callers that want `None` instead of an error on an empty queue.
pub trait TryPop<V, P> {
    fn try_pop(&self) -> Result<Option<Item<V, P>>>;
}

impl<V, P, Q: PriorityQueue<V, P> + ?Sized> TryPop<V, P> for Q {
    fn try_pop(&self) -> Result<Option<Item<V, P>>> {
        match self.pop() {
            Ok(item) => Ok(Some(item)),
            Err(QueueError::PreconditionFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

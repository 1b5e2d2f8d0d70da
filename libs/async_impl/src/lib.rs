use pqueue::{Item, ItemKey, Result};

mod locks;
mod stress;

pub use locks::LockedQueue;
pub use stress::{StressSummary, StressTestCfg, run_stress_test};

/// Async counterpart of [`pqueue::PriorityQueue`]. Waiting for the queue suspends the task
/// instead of blocking the thread.
#[async_trait::async_trait]
pub trait AsyncPriorityQueue<V, P = i64>: Send + Sync + 'static
where
    V: Send + 'static,
    P: Send + 'static,
{
    async fn len(&self) -> usize;
    async fn push(&self, item: Item<V, P>) -> Result<ItemKey>;
    async fn pop(&self) -> Result<Item<V, P>>;
    async fn peek(&self) -> Result<Item<V, P>>;
    async fn update(&self, key: ItemKey, value: V, priority: P) -> Result<()>;
    /// Pops up to `n` items, giving up with an empty batch if the queue cannot be acquired
    /// within `timeout_us`.
    async fn drain(&self, n: usize, timeout_us: u64) -> Result<Vec<Item<V, P>>>;
    async fn validate(&self) -> Result<()>;
}

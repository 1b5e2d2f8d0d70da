mod error;
pub mod heap;
mod indexed;
mod item;
mod order;
mod queue;
#[cfg(any(test, feature = "test-suite"))]
pub mod test;

// region:    --- Exports
pub use error::{InvariantViolation, QueueError, Result};
pub use indexed::IndexedHeap;
pub use item::{Item, ItemKey};
pub use order::{MaxFirst, MinFirst, Order};
pub use queue::{PriorityQueue, TryPop};
// endregion: --- Exports

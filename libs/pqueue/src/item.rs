use std::fmt;

use uuid::Uuid;

/// Position value carried by an [`Item`] that is not (or no longer) stored in a queue.
pub(crate) const REMOVED: usize = usize::MAX;

/// One element of a priority queue: an arbitrary `value` ordered by its `priority`.
///
/// The heap position is owned by the queue. Callers can read it through [`Item::index`] but
/// never write it.
#[derive(Clone, PartialEq, Eq)]
pub struct Item<V, P = i64> {
    pub value: V,
    pub priority: P,
    pub(crate) index: usize,
    pub(crate) key: Option<ItemKey>,
}

impl<V, P> Item<V, P> {
    pub fn new(value: V, priority: P) -> Self {
        Self {
            value,
            priority,
            index: REMOVED,
            key: None,
        }
    }

    /// Current position inside the heap array, `None` if the item is not queued.
    pub fn index(&self) -> Option<usize> {
        (self.index != REMOVED).then_some(self.index)
    }

    /// Handle issued by the last queue this item was pushed to.
    pub fn key(&self) -> Option<ItemKey> {
        self.key
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn into_parts(self) -> (V, P) {
        (self.value, self.priority)
    }
}

impl<V: fmt::Debug, P: fmt::Debug> fmt::Debug for Item<V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("value", &self.value)
            .field("priority", &self.priority)
            .field("index", &self.index())
            .finish()
    }
}

/// Handle to an item living inside a specific queue.
///
/// A key stays valid for as long as its item remains in the queue that issued it. Once the
/// item is popped or removed, its slot is recycled with a new generation, so stale keys can
/// never alias a newer item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub(crate) queue: Uuid,
    pub(crate) slot: usize,
    pub(crate) generation: u64,
}

impl ItemKey {
    /// Identifier of the queue that issued this key.
    pub fn queue_id(&self) -> Uuid {
        self.queue
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}.{}", self.queue, self.slot, self.generation)
    }
}

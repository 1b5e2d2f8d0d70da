use std::fmt;

use log::trace;
use uuid::Uuid;

use crate::{
    InvariantViolation, Item, ItemKey, MinFirst, Order, QueueError, Result,
    heap::{self, HeapStorage},
    item::REMOVED,
};

#[derive(Clone)]
struct Slot<V, P> {
    generation: u64,
    item: Option<Item<V, P>>,
}

/// Unsynchronized priority queue that owns its items and hands out [`ItemKey`]s to address
/// them later on.
///
/// Items live in a slab of slots; the heap itself is an array of slot ids. Each queued item
/// records its own position in that array, which is what makes in-place updates logarithmic.
/// Wrap it in a lock (or give it to a single owner thread) to share it.
pub struct IndexedHeap<V, P = i64, O = MinFirst> {
    id: Uuid,
    order: O,
    heap: Vec<usize>,
    slots: Vec<Slot<V, P>>,
    free: Vec<usize>,
}

impl<V, P: Ord> IndexedHeap<V, P> {
    pub fn new() -> Self {
        Self::with_capacity_and_order(0, MinFirst)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_order(capacity, MinFirst)
    }
}

impl<V, P, O: Order<P> + Default> Default for IndexedHeap<V, P, O> {
    fn default() -> Self {
        Self::with_capacity_and_order(0, O::default())
    }
}

impl<V, P, O: Order<P>> IndexedHeap<V, P, O> {
    pub fn with_order(order: O) -> Self {
        Self::with_capacity_and_order(0, order)
    }

    pub fn with_capacity_and_order(capacity: usize, order: O) -> Self {
        Self {
            id: Uuid::new_v4(),
            order,
            heap: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Identifier stamped into every key this queue issues.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the item at position `i` leaves the queue strictly before the one at `j`.
    pub fn less(&self, i: usize, j: usize) -> Result<bool> {
        self.check_bounds(i)?;
        self.check_bounds(j)?;
        Ok(self.ordered_before(i, j))
    }

    /// Exchanges the items at positions `i` and `j`, keeping their recorded indices in sync.
    ///
    /// Heap order is not restored afterwards; that is up to the caller.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_bounds(i)?;
        self.check_bounds(j)?;
        self.exchange(i, j);
        Ok(())
    }

    /// Returns the item that would be popped next.
    pub fn peek(&self) -> Result<&Item<V, P>> {
        if self.heap.is_empty() {
            return Err(QueueError::PreconditionFailed { op: "peek" });
        }
        Ok(self.item_at(0))
    }

    /// Moves `item` into the queue and returns the key that addresses it from now on.
    pub fn push(&mut self, item: Item<V, P>) -> ItemKey {
        let key = self.attach(item);
        let last = self.heap.len() - 1;
        heap::up(self, last);

        trace!("pushed {key}, len {}", self.heap.len());
        key
    }

    /// Removes and returns the item that orders first.
    pub fn pop(&mut self) -> Result<Item<V, P>> {
        if self.heap.is_empty() {
            return Err(QueueError::PreconditionFailed { op: "pop" });
        }
        let last = self.heap.len() - 1;
        self.exchange(0, last);
        heap::down(self, 0, last);

        let item = self.detach_last();
        trace!("popped {:?}, len {}", item.key, self.heap.len());
        Ok(item)
    }

    /// Replaces value and priority of a queued item and moves it to its new place.
    pub fn update(&mut self, key: ItemKey, value: V, priority: P) -> Result<()> {
        let position = self.position_of(key)?;
        let item = self.item_at_mut(position);
        item.value = value;
        item.priority = priority;
        heap::fix(self, position);

        trace!("updated {key}, now at {:?}", self.item_at_slot(key.slot).index());
        Ok(())
    }

    /// Removes an arbitrary queued item.
    pub fn remove(&mut self, key: ItemKey) -> Result<Item<V, P>> {
        let position = self.position_of(key)?;
        heap::remove_at(self, position);

        trace!("removed {key}, len {}", self.heap.len() - 1);
        Ok(self.detach_last())
    }

    /// Pops up to `n` items in order. Stops early once the queue runs dry.
    pub fn drain(&mut self, n: usize) -> Vec<Item<V, P>> {
        let mut items = Vec::with_capacity(n.min(self.heap.len()));
        for _ in 0..n {
            let Ok(item) = self.pop() else {
                break;
            };
            items.push(item);
        }
        items
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.position_of(key).is_ok()
    }

    pub fn get(&self, key: ItemKey) -> Option<&Item<V, P>> {
        self.position_of(key).ok().map(|position| self.item_at(position))
    }

    /// Items in heap array order, which is neither insertion nor priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Item<V, P>> + '_ {
        self.heap.iter().map(|&slot| self.item_at_slot(slot))
    }

    /// Checks index bookkeeping and heap order for every position.
    pub fn validate(&self) -> std::result::Result<(), InvariantViolation> {
        for (position, item) in self.iter().enumerate() {
            if item.index != position {
                return Err(InvariantViolation::IndexMismatch {
                    position,
                    recorded: item.index(),
                });
            }
        }
        for child in 1..self.heap.len() {
            let parent = heap::parent_of(child);
            if self.ordered_before(child, parent) {
                return Err(InvariantViolation::HeapOrder { parent, child });
            }
        }
        Ok(())
    }

    // region:    --- Slot bookkeeping

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.heap.len() {
            return Err(QueueError::IndexOutOfRange {
                index,
                len: self.heap.len(),
            });
        }
        Ok(())
    }

    /// Resolves `key` to a heap position, provided the item it was issued for is still here.
    fn position_of(&self, key: ItemKey) -> Result<usize> {
        let not_here = QueueError::ItemNotInQueue(key);
        if key.queue != self.id {
            return Err(not_here);
        }
        let Some(Slot {
            generation,
            item: Some(item),
        }) = self.slots.get(key.slot)
        else {
            return Err(not_here);
        };
        if *generation != key.generation || self.heap.get(item.index) != Some(&key.slot) {
            return Err(not_here);
        }
        Ok(item.index)
    }

    fn item_at_slot(&self, slot: usize) -> &Item<V, P> {
        self.slots[slot]
            .item
            .as_ref()
            .expect("heap only refers to occupied slots")
    }

    fn item_at(&self, position: usize) -> &Item<V, P> {
        self.item_at_slot(self.heap[position])
    }

    fn item_at_mut(&mut self, position: usize) -> &mut Item<V, P> {
        self.slots[self.heap[position]]
            .item
            .as_mut()
            .expect("heap only refers to occupied slots")
    }

    /// Places `item` in a free slot at the end of the heap array, without restoring order.
    fn attach(&mut self, mut item: Item<V, P>) -> ItemKey {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    item: None,
                });
                self.slots.len() - 1
            }
        };
        let key = ItemKey {
            queue: self.id,
            slot,
            generation: self.slots[slot].generation,
        };

        item.index = self.heap.len();
        item.key = Some(key);
        self.slots[slot].item = Some(item);
        self.heap.push(slot);
        key
    }

    /// Takes the item at the last heap position out of the queue and recycles its slot.
    fn detach_last(&mut self) -> Item<V, P> {
        let slot = self
            .heap
            .pop()
            .expect("callers check that the heap is not empty");
        let entry = &mut self.slots[slot];
        let mut item = entry.item.take().expect("heap only refers to occupied slots");
        entry.generation += 1;
        self.free.push(slot);

        item.index = REMOVED;
        item
    }

    fn ordered_before(&self, i: usize, j: usize) -> bool {
        self.order
            .less(&self.item_at(i).priority, &self.item_at(j).priority)
    }

    fn exchange(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.item_at_mut(i).index = i;
        self.item_at_mut(j).index = j;
    }

    // endregion: --- Slot bookkeeping
}

impl<V, P, O: Order<P>> HeapStorage for IndexedHeap<V, P, O> {
    fn len(&self) -> usize {
        self.heap.len()
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.ordered_before(i, j)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.exchange(i, j);
    }
}

impl<V, P, O: Order<P>> Extend<Item<V, P>> for IndexedHeap<V, P, O> {
    /// Appends all items first and re-establishes heap order once, in linear time.
    fn extend<I: IntoIterator<Item = Item<V, P>>>(&mut self, iter: I) {
        for item in iter {
            self.attach(item);
        }
        heap::init(self);
    }
}

impl<V, P, O: Order<P> + Default> FromIterator<Item<V, P>> for IndexedHeap<V, P, O> {
    fn from_iter<I: IntoIterator<Item = Item<V, P>>>(iter: I) -> Self {
        let mut queue = Self::default();
        queue.extend(iter);
        queue
    }
}

/// A clone is a separate queue with its own id. Keys of the original do not address its items.
impl<V: Clone, P: Clone, O: Clone> Clone for IndexedHeap<V, P, O> {
    fn clone(&self) -> Self {
        let id = Uuid::new_v4();
        let mut slots = self.slots.clone();
        for item in slots.iter_mut().filter_map(|slot| slot.item.as_mut()) {
            if let Some(key) = item.key.as_mut() {
                key.queue = id;
            }
        }
        Self {
            id,
            order: self.order.clone(),
            heap: self.heap.clone(),
            slots,
            free: self.free.clone(),
        }
    }
}

impl<V: fmt::Debug, P: fmt::Debug, O> fmt::Debug for IndexedHeap<V, P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.heap.iter().filter_map(|&slot| self.slots[slot].item.as_ref());
        f.debug_struct("IndexedHeap")
            .field("id", &self.id)
            .field("items", &items.collect::<Vec<_>>())
            .finish()
    }
}

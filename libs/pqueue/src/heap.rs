//! Binary heap algorithm over any storage that can compare and exchange positions.
//!
//! The functions here never touch elements directly. Every rearrangement goes through
//! [`HeapStorage::swap`], so a storage that records positions inside its elements only has to
//! do its bookkeeping in one place.

pub trait HeapStorage {
    fn len(&self) -> usize;
    /// Whether the element at `i` must leave the heap before the one at `j`.
    /// Only called with in-bounds positions.
    fn less(&self, i: usize, j: usize) -> bool;
    /// Exchanges the elements at `i` and `j`. Only called with in-bounds positions.
    fn swap(&mut self, i: usize, j: usize);
}

/// # Panics
/// The root has no parent; `i` must be greater than zero.
#[inline]
pub fn parent_of(i: usize) -> usize {
    assert!(i > 0, "the root has no parent");
    (i - 1) / 2
}

#[inline]
pub fn left_child_of(i: usize) -> usize {
    2 * i + 1
}

/// Establishes the heap property over the whole storage in linear time.
pub fn init<S: HeapStorage + ?Sized>(storage: &mut S) {
    let n = storage.len();
    for i in (0..n / 2).rev() {
        down(storage, i, n);
    }
}

/// Moves the element at `j` towards the root while it orders before its parent.
pub fn up<S: HeapStorage + ?Sized>(storage: &mut S, mut j: usize) {
    while j > 0 {
        let parent = parent_of(j);
        if !storage.less(j, parent) {
            break;
        }
        storage.swap(parent, j);
        j = parent;
    }
}

/// Moves the element at `i0` towards the leaves of the first `n` positions, always descending
/// into the child that orders first. Returns whether the element moved.
pub fn down<S: HeapStorage + ?Sized>(storage: &mut S, i0: usize, n: usize) -> bool {
    let mut i = i0;
    loop {
        let left = left_child_of(i);
        if left >= n {
            break;
        }
        let mut best = left;
        let right = left + 1;
        if right < n && storage.less(right, left) {
            best = right;
        }
        if !storage.less(best, i) {
            break;
        }
        storage.swap(i, best);
        i = best;
    }
    i > i0
}

/// Restores the heap property after the element at `i` changed its priority.
pub fn fix<S: HeapStorage + ?Sized>(storage: &mut S, i: usize) {
    let n = storage.len();
    if !down(storage, i, n) {
        up(storage, i);
    }
}

/// Detaches the element at `i` by moving it to the last position and restoring order over the
/// rest. The caller removes the last position afterwards.
///
/// # Panics
/// Panics if `i` is not a position of `storage`, which includes every `i` on an empty storage.
pub fn remove_at<S: HeapStorage + ?Sized>(storage: &mut S, i: usize) {
    let n = storage.len();
    assert!(i < n, "remove_at({i}) on a heap of {n} elements");
    let last = n - 1;
    if i != last {
        storage.swap(i, last);
        if !down(storage, i, last) {
            up(storage, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HeapStorage, fix, init, parent_of, remove_at, up};

    struct Plain(Vec<i32>);

    impl HeapStorage for Plain {
        fn len(&self) -> usize {
            self.0.len()
        }
        fn less(&self, i: usize, j: usize) -> bool {
            self.0[i] < self.0[j]
        }
        fn swap(&mut self, i: usize, j: usize) {
            self.0.swap(i, j);
        }
    }

    fn is_heap(v: &[i32]) -> bool {
        (1..v.len()).all(|i| v[(i - 1) / 2] <= v[i])
    }

    #[test]
    fn init_builds_a_heap() {
        let mut storage = Plain(vec![9, 4, 7, 1, 8, 2, 6, 3, 5, 0]);
        init(&mut storage);

        assert!(is_heap(&storage.0));
        assert_eq!(storage.0[0], 0);
    }

    #[test]
    fn up_after_append() {
        let mut storage = Plain(vec![1, 3, 2, 5, 4]);
        storage.0.push(0);
        up(&mut storage, 5);

        assert!(is_heap(&storage.0));
        assert_eq!(storage.0[0], 0);
    }

    #[test]
    fn fix_in_both_directions() {
        let mut storage = Plain(vec![1, 3, 2, 5, 4, 6]);

        storage.0[4] = 0;
        fix(&mut storage, 4);
        assert!(is_heap(&storage.0));
        assert_eq!(storage.0[0], 0);

        storage.0[0] = 10;
        fix(&mut storage, 0);
        assert!(is_heap(&storage.0));
        assert_eq!(storage.0[0], 1);
    }

    #[test]
    fn remove_from_the_middle() {
        let mut storage = Plain(vec![0, 5, 1, 6, 7, 2, 3]);
        remove_at(&mut storage, 1);
        let removed = storage.0.pop();

        assert_eq!(removed, Some(5));
        assert!(is_heap(&storage.0));
    }

    #[test]
    fn remove_the_only_element() {
        let mut storage = Plain(vec![7]);
        remove_at(&mut storage, 0);
        assert_eq!(storage.0.pop(), Some(7));
    }

    #[test]
    #[should_panic(expected = "on a heap of 0 elements")]
    fn remove_from_empty_storage() {
        remove_at(&mut Plain(vec![]), 0);
    }

    #[test]
    #[should_panic(expected = "root has no parent")]
    fn root_has_no_parent() {
        parent_of(0);
    }
}

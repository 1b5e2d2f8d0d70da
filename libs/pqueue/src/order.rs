//! Ordering capabilities that decide which priority leaves the queue first.

/// Strict "comes before" relation over priorities.
///
/// `less(a, b)` must be a strict weak ordering, otherwise the heap property cannot hold.
pub trait Order<P> {
    fn less(&self, a: &P, b: &P) -> bool;
}

/// Lowest priority value first. This is the default ordering of every queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinFirst;

/// Highest priority value first.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxFirst;

impl<P: Ord> Order<P> for MinFirst {
    fn less(&self, a: &P, b: &P) -> bool {
        a < b
    }
}

impl<P: Ord> Order<P> for MaxFirst {
    fn less(&self, a: &P, b: &P) -> bool {
        a > b
    }
}

// region:    --- Closures as ad-hoc orderings

impl<P, F> Order<P> for F
where
    F: Fn(&P, &P) -> bool,
{
    fn less(&self, a: &P, b: &P) -> bool {
        self(a, b)
    }
}

// endregion: --- Closures as ad-hoc orderings

#[cfg(test)]
mod tests {
    use super::{MaxFirst, MinFirst, Order};

    #[test]
    fn min_and_max_are_strict() {
        assert!(MinFirst.less(&1, &2));
        assert!(!MinFirst.less(&2, &2));
        assert!(MaxFirst.less(&2, &1));
        assert!(!MaxFirst.less(&2, &2));
    }

    #[test]
    fn closure_tie_break() {
        // -- priority first, then the smaller sequence number
        let order = |a: &(u32, u64), b: &(u32, u64)| a.0 < b.0 || (a.0 == b.0 && a.1 < b.1);

        assert!(order.less(&(1, 9), &(2, 0)));
        assert!(order.less(&(1, 0), &(1, 1)));
        assert!(!order.less(&(1, 1), &(1, 1)));
    }
}

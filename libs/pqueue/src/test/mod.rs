//! Shared test harness for every [`PriorityQueue`](crate::PriorityQueue) implementation.

use crate::ItemKey;

pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("cannot {op} on an empty queue")]
    PreconditionFailed { op: &'static str },
    #[error("item {0} is not in this queue")]
    ItemNotInQueue(ItemKey),
    #[error("index {index} is out of range for a queue of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("queue lock is poisoned, a holder panicked mid-operation")]
    Poisoned,
    #[error("queue worker has stopped")]
    Disconnected,
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Broken structural property found by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("item at {child} orders before its parent at {parent}")]
    HeapOrder { parent: usize, child: usize },
    #[error("item at position {position} records index {recorded:?}")]
    IndexMismatch {
        position: usize,
        recorded: Option<usize>,
    },
}

//! Thread-safe wrappers around [`pqueue::IndexedHeap`].
//!
//! [`LockedQueue`] guards each queue with its own mutex, [`ChanneledQueue`] gives the heap to a
//! dedicated worker thread and talks to it over channels.

mod channel_based;
mod lock_based;
#[cfg(test)]
mod test;

// region:    --- Exports
pub use channel_based::ChanneledQueue;
pub use lock_based::LockedQueue;
// endregion: --- Exports

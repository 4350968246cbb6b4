use std::future::Future;

use crate::error::MigResult;

/// Durable key/value store holding per-table offsets and run-start markers.
///
/// The store is external and shared: checkpoints written here survive
/// process restarts, which is what makes an interrupted run resumable.
/// It is not transactional with either database, so a worker persists its
/// offset only after the corresponding batch has been written.
///
/// Per-table offset keys are accessed by exactly one worker at a time by
/// construction; the store provides no compare-and-swap.
pub trait CheckpointStore {
    /// Reads the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> impl Future<Output = MigResult<Option<i64>>> + Send;

    /// Unconditionally stores `value` under `key`.
    fn set(&self, key: &str, value: i64) -> impl Future<Output = MigResult<()>> + Send;

    /// Atomically stores `value` under `key` and returns the previous
    /// value, or `None` when the key was absent.
    fn get_and_set(&self, key: &str, value: i64)
    -> impl Future<Output = MigResult<Option<i64>>> + Send;

    /// Removes `key` from the store.
    fn clear(&self, key: &str) -> impl Future<Output = MigResult<()>> + Send;
}

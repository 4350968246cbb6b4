pub mod store;

pub use store::{CheckpointStore, MemoryCheckpointStore, RedisCheckpointStore};

/// Key of the run-start marker for a copy run.
const COPY_RUN_MARKER: &str = "DataCopyTimeNano";

/// Key of the run-start marker for a sync run.
const SYNC_RUN_MARKER: &str = "StartTimeNano";

/// The kind of run a checkpointed pipeline is executing.
///
/// Copy and sync runs share the per-table offset keys (only one kind of
/// run is expected at a time) but carry distinct run-start markers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunKind {
    /// Bulk initial load of the source into the target.
    Copy,
    /// Content-diff detection and reconciliation.
    Sync,
}

impl RunKind {
    /// Key under which this run kind records its start timestamp.
    pub fn marker_key(&self) -> &'static str {
        match self {
            RunKind::Copy => COPY_RUN_MARKER,
            RunKind::Sync => SYNC_RUN_MARKER,
        }
    }

    /// Human-readable task name, used in log lines and API responses.
    pub fn task_name(&self) -> &'static str {
        match self {
            RunKind::Copy => "DataCopy",
            RunKind::Sync => "DataSync",
        }
    }
}

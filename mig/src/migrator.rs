//! Run orchestration: fans one worker per table into the chosen pipeline
//! and aggregates their outcomes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mig_config::shared::BatchConfig;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::catalog;
use crate::checkpoint::{CheckpointStore, RunKind};
use crate::concurrency::shutdown::{ShutdownRx, ShutdownTx, create_shutdown_channel};
use crate::error::{ErrorKind, MigError, MigResult};
use crate::mig_error;
use crate::pipeline::{copy, sync};

/// The migration engine's entry point.
///
/// Holds the two pooled database handles and the checkpoint store shared
/// by every per-table worker. A run enumerates the source's tables once,
/// writes the run-start marker, then fans the tables out into the chosen
/// pipeline with a bounded number of concurrent workers.
///
/// Concurrent runs against the same target are an operator error; the
/// engine provides no distributed lock.
#[derive(Debug, Clone)]
pub struct Migrator<S> {
    source: PgPool,
    target: PgPool,
    store: S,
    batch: BatchConfig,
    max_table_workers: usize,
    shutdown_tx: ShutdownTx,
    shutdown_rx: ShutdownRx,
}

impl<S> Migrator<S>
where
    S: CheckpointStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        source: PgPool,
        target: PgPool,
        store: S,
        batch: BatchConfig,
        max_table_workers: usize,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();

        Self {
            source,
            target,
            store,
            batch,
            // A zero cap would starve every worker of a permit.
            max_table_workers: max_table_workers.max(1),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Returns a handle that cancels in-flight runs when triggered.
    ///
    /// Workers observe the signal at batch boundaries and fail with
    /// [`ErrorKind::Cancelled`]; checkpoints written up to that point are
    /// retained.
    pub fn shutdown_handle(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Runs the bulk copy pipeline over every source table.
    ///
    /// Returns the run's start time on success.
    pub async fn run_copy(&self) -> MigResult<DateTime<Utc>> {
        self.run(RunKind::Copy).await
    }

    /// Runs the content-diff sync pipeline over every source table.
    ///
    /// Returns the run's start time on success.
    pub async fn run_sync(&self) -> MigResult<DateTime<Utc>> {
        self.run(RunKind::Sync).await
    }

    /// Reports per-table `"<source> / <target>"` row counts.
    pub async fn status(&self) -> MigResult<BTreeMap<String, String>> {
        catalog::migration_status(&self.source, &self.target).await
    }

    async fn run(&self, kind: RunKind) -> MigResult<DateTime<Utc>> {
        let started_at = Utc::now();
        let marker = started_at.timestamp_nanos_opt().unwrap_or_default();

        // The marker's presence is informational only; a prior value means
        // an earlier run died without cleaning up.
        if let Some(previous) = self.store.get_and_set(kind.marker_key(), marker).await? {
            warn!(previous, "previous run-start marker found");
        }

        let tables = catalog::list_tables(&self.source).await?;
        info!(task = kind.task_name(), tables = tables.len(), "run started");

        let semaphore = Arc::new(Semaphore::new(self.max_table_workers));
        let mut workers = JoinSet::new();
        for (table, row_count) in tables {
            let source = self.source.clone();
            let target = self.target.clone();
            let store = self.store.clone();
            let batch = self.batch.clone();
            let shutdown = self.shutdown_rx.clone();
            let semaphore = Arc::clone(&semaphore);

            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| mig_error!(ErrorKind::Cancelled, "Worker admission aborted"))?;

                match kind {
                    RunKind::Copy => {
                        copy::copy_table(
                            &source, &target, &store, &table, row_count, &batch, &shutdown,
                        )
                        .await
                    }
                    RunKind::Sync => {
                        sync::sync_table(
                            &source, &target, &store, &table, row_count, &batch, &shutdown,
                        )
                        .await
                    }
                }
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(error = %err, "table worker failed");
                    errors.push(err);
                }
                Err(err) => {
                    errors.push(mig_error!(ErrorKind::Unknown, "Table worker panicked", err));
                }
            }
        }

        if !errors.is_empty() {
            // The run-start marker is left in place on failure.
            return Err(errors.into());
        }

        self.store.clear(kind.marker_key()).await?;
        info!(task = kind.task_name(), "run complete");

        Ok(started_at)
    }
}

//! Bulk initial load of one table from the source into the target.

use mig_config::shared::BatchConfig;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::bail;
use crate::checkpoint::CheckpointStore;
use crate::concurrency::shutdown::{ShutdownRx, shutdown_requested};
use crate::db;
use crate::error::{ErrorKind, MigError, MigResult};

/// Copies `table` from the source into the target, in ascending-`id`
/// batches of `batch.create_size` rows.
///
/// Assumes the target table is empty or contains a prefix of the source's
/// `id`-ordered rows. The current offset is persisted after every batch,
/// so an interrupted worker resumes where it stopped instead of inserting
/// duplicates. Resume is rank-based: it relies on the source's `id`
/// sequence being append-only for the duration of the run, and on rows
/// below the checkpoint not being deleted between runs.
///
/// On clean completion the table's checkpoint is reset to zero.
pub async fn copy_table<S>(
    source: &PgPool,
    target: &PgPool,
    store: &S,
    table: &str,
    row_count: i64,
    batch: &BatchConfig,
    shutdown: &ShutdownRx,
) -> MigResult<()>
where
    S: CheckpointStore,
{
    let mut offset = match store.get(table).await? {
        Some(offset) => offset,
        None => {
            store.set(table, 0).await?;
            info!(table, "initialized copy starting point");
            0
        }
    };

    while offset < row_count {
        if shutdown_requested(shutdown) {
            bail!(ErrorKind::Cancelled, "Copy worker cancelled", table);
        }

        debug!(table, offset, "copying batch");
        let rows = db::fetch_batch(source, table, offset, batch.create_size).await?;
        if rows.is_empty() {
            // The source shrank below the count sampled at run start.
            break;
        }

        db::insert_batch(target, table, &rows).await?;

        offset += batch.create_size as i64;
        store.set(table, offset).await?;
    }

    store.set(table, 0).await?;
    info!(table, "table copy complete, checkpoint reset");

    Ok(())
}

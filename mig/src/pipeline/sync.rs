//! Content-diff detection and per-row reconciliation for one table.

use std::sync::Arc;

use mig_config::shared::BatchConfig;
use sqlx::PgPool;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::checkpoint::CheckpointStore;
use crate::concurrency::shutdown::{ShutdownRx, shutdown_requested};
use crate::db::{self, RowDigest};
use crate::error::{ErrorKind, MigError, MigResult};
use crate::{bail, mig_error};

/// Brings `table` in the target into content-equality with the source for
/// rows that exist in both, and inserts rows the target is missing inside
/// the scanned range.
pub async fn sync_table<S>(
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
    let ids = build_diff_ids(source, target, store, table, row_count, batch, shutdown).await?;
    if ids.is_empty() {
        info!(table, "no drift detected");
        return Ok(());
    }

    info!(table, rows = ids.len(), "rows need update");

    apply_diff(source, target, table, &ids, batch.update_size, shutdown).await
}

/// Phase A: scans both sides in `batch.search_size` windows of
/// `(id, fingerprint)` pairs and accumulates the ids of divergent rows.
///
/// The scan offset is checkpointed per window, so an interrupted detection
/// pass resumes mid-table. On completion the checkpoint is reset to zero
/// and the accumulated id list is returned.
pub async fn build_diff_ids<S>(
    source: &PgPool,
    target: &PgPool,
    store: &S,
    table: &str,
    row_count: i64,
    batch: &BatchConfig,
    shutdown: &ShutdownRx,
) -> MigResult<Vec<i64>>
where
    S: CheckpointStore,
{
    let mut offset = match store.get(table).await? {
        Some(offset) => offset,
        None => {
            store.set(table, 0).await?;
            info!(table, "initialized sync starting point");
            0
        }
    };

    let mut ids = Vec::new();
    while offset < row_count {
        if shutdown_requested(shutdown) {
            bail!(ErrorKind::Cancelled, "Sync worker cancelled", table);
        }

        debug!(table, offset, "scanning window");
        let source_rows = db::fetch_fingerprints(source, table, offset, batch.search_size).await?;
        if source_rows.is_empty() {
            // The source shrank below the count sampled at run start.
            break;
        }
        let target_rows = db::fetch_fingerprints(target, table, offset, batch.search_size).await?;

        ids.extend(diff_ids(&source_rows, &target_rows));

        offset += batch.search_size as i64;
        store.set(table, offset).await?;
    }

    store.set(table, 0).await?;

    Ok(ids)
}

/// Phase B: reconciles the recorded ids in chunks of `update_size`.
///
/// Each chunk's rows are fetched from the source in one statement and
/// upserted into the target in parallel; chunks themselves run
/// sequentially. The first failed upsert aborts the table.
pub async fn apply_diff(
    source: &PgPool,
    target: &PgPool,
    table: &str,
    ids: &[i64],
    update_size: usize,
    shutdown: &ShutdownRx,
) -> MigResult<()> {
    for chunk in ids.chunks(update_size) {
        if shutdown_requested(shutdown) {
            bail!(ErrorKind::Cancelled, "Sync worker cancelled", table);
        }

        let rows = db::fetch_rows_by_ids(source, table, chunk).await?;
        if rows.is_empty() {
            continue;
        }

        let sql = Arc::new(db::upsert_sql(table, &rows.columns));
        let columns = Arc::new(rows.columns);

        let mut tasks = JoinSet::new();
        for row in rows.rows {
            let target = target.clone();
            let sql = Arc::clone(&sql);
            let columns = Arc::clone(&columns);

            tasks.spawn(async move { db::upsert_row(&target, &sql, &columns, &row).await });
        }

        while let Some(joined) = tasks.join_next().await {
            joined
                .map_err(|err| mig_error!(ErrorKind::Unknown, "Reconciliation task panicked", err))??;
        }
    }

    Ok(())
}

/// Walks two positionally aligned fingerprint windows and returns the
/// source ids that need reconciling.
///
/// A pair differs when either the fingerprint or the id at that rank
/// differs; ranks past the end of the target window count as missing rows
/// and are recorded too.
fn diff_ids(source: &[RowDigest], target: &[RowDigest]) -> Vec<i64> {
    source
        .iter()
        .enumerate()
        .filter(|(index, source_row)| target.get(*index) != Some(*source_row))
        .map(|(_, source_row)| source_row.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digests(rows: &[(i64, &str)]) -> Vec<RowDigest> {
        rows.iter()
            .map(|(id, digest)| RowDigest {
                id: *id,
                digest: digest.to_string(),
            })
            .collect()
    }

    #[test]
    fn equal_windows_produce_no_ids() {
        let source = digests(&[(1, "a"), (2, "b"), (3, "c")]);
        let target = source.clone();

        assert!(diff_ids(&source, &target).is_empty());
    }

    #[test]
    fn fingerprint_drift_records_the_source_id() {
        let source = digests(&[(1, "a"), (2, "b"), (3, "c")]);
        let target = digests(&[(1, "a"), (2, "DRIFTED"), (3, "c")]);

        assert_eq!(diff_ids(&source, &target), vec![2]);
    }

    #[test]
    fn missing_target_tail_is_recorded() {
        let source = digests(&[(1, "a"), (2, "b"), (3, "c")]);
        let target = digests(&[(1, "a")]);

        assert_eq!(diff_ids(&source, &target), vec![2, 3]);
    }

    #[test]
    fn positional_id_mismatch_is_recorded() {
        // The target is missing id 2, shifting every later row up one rank.
        let source = digests(&[(1, "a"), (2, "b"), (3, "c")]);
        let target = digests(&[(1, "a"), (3, "c")]);

        assert_eq!(diff_ids(&source, &target), vec![2, 3]);
    }

    #[test]
    fn empty_target_records_every_source_id() {
        let source = digests(&[(1, "a"), (2, "b")]);

        assert_eq!(diff_ids(&source, &[]), vec![1, 2]);
    }

    #[test]
    fn detection_is_idempotent_on_equal_inputs() {
        let source = digests(&[(5, "x")]);
        let target = digests(&[(5, "x")]);

        assert!(diff_ids(&source, &target).is_empty());
        assert!(diff_ids(&source, &target).is_empty());
    }
}

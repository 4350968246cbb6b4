//! Statement construction and execution for the batch pipelines.
//!
//! The engine only ever issues a handful of statement shapes: keyset-style
//! anchored selects, multi-row inserts, id-keyed upserts and an id-list
//! fetch. The SQL text is built by pure constructors so the exact shapes
//! are testable without a database; the executors below them bind dynamic
//! [`Cell`] values and decode into [`RowBatch`]es.

use sqlx::PgPool;
use sqlx::postgres::PgRow;
use sqlx::{Column as _, Row as _, TypeInfo as _};

use crate::error::{ErrorKind, MigError, MigResult};
use crate::mig_error;
use crate::types::{Cell, Column, RowBatch, TableRow};

/// An `(id, fingerprint)` pair scanned during diff detection.
///
/// The fingerprint is the server-side digest of the row's canonical
/// textual serialization; two rows compare equal iff their fingerprints
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDigest {
    pub id: i64,
    pub digest: String,
}

/// Double-quotes an identifier for interpolation into a statement.
///
/// Table names come out of `information_schema` rather than from user
/// input, but they still need quoting to survive mixed case and reserved
/// words.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Builds the anchored keyset select for one scan window.
///
/// `OFFSET` is only used in the anchor subquery to find the window's first
/// `id`; the outer scan is an index range over `id`, which keeps deep
/// windows from rescanning the whole table.
pub fn anchored_select_sql(table: &str, projection: &str) -> String {
    let table = quote_ident(table);

    format!(
        "SELECT {projection} FROM {table} \
         WHERE id >= (SELECT id FROM {table} ORDER BY id ASC LIMIT 1 OFFSET $1) \
         ORDER BY id ASC LIMIT $2"
    )
}

/// Projection computing the row fingerprint next to the scan key.
pub fn fingerprint_projection(table: &str) -> String {
    let table = quote_ident(table);

    format!("id::int8 AS id, md5(textin(record_out({table}))) AS digest")
}

/// Builds a multi-row insert with row-major numbered placeholders.
pub fn insert_sql(table: &str, columns: &[Column], rows: usize) -> String {
    let column_list = columns
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ");

    let width = columns.len();
    let mut values = Vec::with_capacity(rows);
    for row in 0..rows {
        let placeholders = (1..=width)
            .map(|column| format!("${}", row * width + column))
            .collect::<Vec<_>>()
            .join(", ");
        values.push(format!("({placeholders})"));
    }

    format!(
        "INSERT INTO {} ({column_list}) VALUES {}",
        quote_ident(table),
        values.join(", ")
    )
}

/// Builds the reconciliation upsert for one row.
///
/// Ids recorded during diff detection may have no counterpart row in the
/// target, so reconciliation inserts on conflict-free ids and updates
/// otherwise.
pub fn upsert_sql(table: &str, columns: &[Column]) -> String {
    let column_list = columns
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ");

    let placeholders = (1..=columns.len())
        .map(|index| format!("${index}"))
        .collect::<Vec<_>>()
        .join(", ");

    let assignments = columns
        .iter()
        .filter(|column| column.name != "id")
        .map(|column| {
            let name = quote_ident(&column.name);
            format!("{name} = EXCLUDED.{name}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let table = quote_ident(table);
    if assignments.is_empty() {
        format!(
            "INSERT INTO {table} ({column_list}) VALUES ({placeholders}) \
             ON CONFLICT (id) DO NOTHING"
        )
    } else {
        format!(
            "INSERT INTO {table} ({column_list}) VALUES ({placeholders}) \
             ON CONFLICT (id) DO UPDATE SET {assignments}"
        )
    }
}

/// Builds the id-list fetch used by the reconciliation phase.
pub fn select_by_ids_sql(table: &str) -> String {
    let table = quote_ident(table);

    format!("SELECT * FROM {table} WHERE id = ANY($1) ORDER BY id ASC")
}

/// Fetches one full-row scan window from `pool`.
pub async fn fetch_batch(
    pool: &PgPool,
    table: &str,
    offset: i64,
    limit: usize,
) -> MigResult<RowBatch> {
    let sql = anchored_select_sql(table, "*");
    let rows = sqlx::query(&sql)
        .bind(offset)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .map_err(|err| mig_error!(ErrorKind::BatchReadFailed, "Batch select failed", err))?;

    decode_batch(rows)
}

/// Fetches one `(id, fingerprint)` scan window from `pool`.
pub async fn fetch_fingerprints(
    pool: &PgPool,
    table: &str,
    offset: i64,
    limit: usize,
) -> MigResult<Vec<RowDigest>> {
    let sql = anchored_select_sql(table, &fingerprint_projection(table));
    let rows = sqlx::query(&sql)
        .bind(offset)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .map_err(|err| {
            mig_error!(ErrorKind::BatchReadFailed, "Fingerprint select failed", err)
        })?;

    rows.iter()
        .map(|row| {
            let id = row.try_get("id").map_err(|err| {
                mig_error!(ErrorKind::InvalidData, "Failed to decode scan key", err)
            })?;
            let digest = row.try_get("digest").map_err(|err| {
                mig_error!(ErrorKind::InvalidData, "Failed to decode fingerprint", err)
            })?;

            Ok(RowDigest { id, digest })
        })
        .collect()
}

/// Fetches the full rows for a reconciliation chunk from `pool`.
pub async fn fetch_rows_by_ids(pool: &PgPool, table: &str, ids: &[i64]) -> MigResult<RowBatch> {
    let sql = select_by_ids_sql(table);
    let rows = sqlx::query(&sql)
        .bind(ids.to_vec())
        .fetch_all(pool)
        .await
        .map_err(|err| mig_error!(ErrorKind::BatchReadFailed, "Chunk select failed", err))?;

    decode_batch(rows)
}

/// Writes a fetched batch into the target table with one multi-row insert.
pub async fn insert_batch(pool: &PgPool, table: &str, batch: &RowBatch) -> MigResult<()> {
    let sql = insert_sql(table, &batch.columns, batch.rows.len());

    let mut query = sqlx::query(&sql);
    for row in &batch.rows {
        for (cell, column) in row.values.iter().zip(&batch.columns) {
            query = cell.bind(query, &column.type_name);
        }
    }

    query
        .execute(pool)
        .await
        .map_err(|err| mig_error!(ErrorKind::BatchWriteFailed, "Batch insert failed", err))?;

    Ok(())
}

/// Writes one reconciled row into the target table.
///
/// `sql` is the [`upsert_sql`] statement shared by the row's chunk.
pub async fn upsert_row(
    pool: &PgPool,
    sql: &str,
    columns: &[Column],
    row: &TableRow,
) -> MigResult<()> {
    let mut query = sqlx::query(sql);
    for (cell, column) in row.values.iter().zip(columns) {
        query = cell.bind(query, &column.type_name);
    }

    query
        .execute(pool)
        .await
        .map_err(|err| mig_error!(ErrorKind::BatchWriteFailed, "Row upsert failed", err))?;

    Ok(())
}

/// Decodes fetched rows into a [`RowBatch`], taking the column layout from
/// the first row.
fn decode_batch(rows: Vec<PgRow>) -> MigResult<RowBatch> {
    let Some(first) = rows.first() else {
        return Ok(RowBatch::default());
    };

    let columns: Vec<Column> = first
        .columns()
        .iter()
        .map(|column| Column {
            name: column.name().to_owned(),
            type_name: column.type_info().name().to_owned(),
        })
        .collect();

    let mut decoded = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            values.push(Cell::try_from_row(row, index, &column.type_name)?);
        }
        decoded.push(TableRow::new(values));
    }

    Ok(RowBatch {
        columns,
        rows: decoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[(&str, &str)]) -> Vec<Column> {
        names
            .iter()
            .map(|(name, type_name)| Column {
                name: name.to_string(),
                type_name: type_name.to_string(),
            })
            .collect()
    }

    #[test]
    fn quote_ident_escapes_embedded_quotes() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn anchored_select_seeks_instead_of_scanning() {
        let sql = anchored_select_sql("orders", "*");

        assert_eq!(
            sql,
            "SELECT * FROM \"orders\" \
             WHERE id >= (SELECT id FROM \"orders\" ORDER BY id ASC LIMIT 1 OFFSET $1) \
             ORDER BY id ASC LIMIT $2"
        );
    }

    #[test]
    fn fingerprint_projection_digests_the_whole_row() {
        let projection = fingerprint_projection("orders");

        assert_eq!(
            projection,
            "id::int8 AS id, md5(textin(record_out(\"orders\"))) AS digest"
        );
    }

    #[test]
    fn insert_sql_numbers_placeholders_row_major() {
        let columns = columns(&[("id", "INT8"), ("name", "TEXT")]);

        let sql = insert_sql("orders", &columns, 2);

        assert_eq!(
            sql,
            "INSERT INTO \"orders\" (\"id\", \"name\") VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn upsert_sql_excludes_id_from_assignments() {
        let columns = columns(&[("id", "INT8"), ("name", "TEXT"), ("qty", "INT4")]);

        let sql = upsert_sql("orders", &columns);

        assert_eq!(
            sql,
            "INSERT INTO \"orders\" (\"id\", \"name\", \"qty\") VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \"name\" = EXCLUDED.\"name\", \
             \"qty\" = EXCLUDED.\"qty\""
        );
    }

    #[test]
    fn upsert_sql_on_id_only_table_does_nothing_on_conflict() {
        let columns = columns(&[("id", "INT8")]);

        let sql = upsert_sql("markers", &columns);

        assert_eq!(
            sql,
            "INSERT INTO \"markers\" (\"id\") VALUES ($1) ON CONFLICT (id) DO NOTHING"
        );
    }

    #[test]
    fn select_by_ids_orders_by_scan_key() {
        assert_eq!(
            select_by_ids_sql("orders"),
            "SELECT * FROM \"orders\" WHERE id = ANY($1) ORDER BY id ASC"
        );
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use crate::error::{ErrorKind, MigError, MigResult};
use crate::mig_error;

/// A dynamically typed scalar value moved between the two databases.
///
/// Rows are opaque to the engine apart from their `id` column, so every
/// value travels as a tagged variant instead of a statically typed field.
/// The variants cover the scalar types the engine is prepared to move;
/// anything else fails the batch with [`ErrorKind::InvalidData`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Numeric(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Json(serde_json::Value),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeStamp(NaiveDateTime),
    TimeStampTz(DateTime<Utc>),
}

impl Cell {
    /// Decodes the cell at `index` from a fetched row.
    ///
    /// Dispatches on the column's Postgres type name. SQL NULL decodes to
    /// [`Cell::Null`] regardless of the column type.
    pub fn try_from_row(row: &PgRow, index: usize, type_name: &str) -> MigResult<Cell> {
        let cell = match type_name {
            "BOOL" => decode(row, index, Cell::Bool)?,
            "INT2" => decode(row, index, Cell::I16)?,
            "INT4" => decode(row, index, Cell::I32)?,
            "INT8" => decode(row, index, Cell::I64)?,
            "FLOAT4" => decode(row, index, Cell::F32)?,
            "FLOAT8" => decode(row, index, Cell::F64)?,
            "NUMERIC" => decode(row, index, Cell::Numeric)?,
            "TEXT" | "VARCHAR" | "CHAR" | "NAME" => decode(row, index, Cell::String)?,
            "BYTEA" => decode(row, index, Cell::Bytes)?,
            "UUID" => decode(row, index, Cell::Uuid)?,
            "JSON" | "JSONB" => decode(row, index, Cell::Json)?,
            "DATE" => decode(row, index, Cell::Date)?,
            "TIME" => decode(row, index, Cell::Time)?,
            "TIMESTAMP" => decode(row, index, Cell::TimeStamp)?,
            "TIMESTAMPTZ" => decode(row, index, Cell::TimeStampTz)?,
            other => {
                return Err(mig_error!(
                    ErrorKind::InvalidData,
                    "Unsupported column type",
                    other
                ));
            }
        };

        Ok(cell)
    }

    /// Binds this cell as the next placeholder of `query`.
    ///
    /// `type_name` is the Postgres type of the destination column; it is
    /// only consulted for [`Cell::Null`], which has to be bound with the
    /// column's type for the statement to plan.
    pub fn bind<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
        type_name: &str,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            Cell::Null => bind_null(query, type_name),
            Cell::Bool(value) => query.bind(*value),
            Cell::I16(value) => query.bind(*value),
            Cell::I32(value) => query.bind(*value),
            Cell::I64(value) => query.bind(*value),
            Cell::F32(value) => query.bind(*value),
            Cell::F64(value) => query.bind(*value),
            Cell::Numeric(value) => query.bind(*value),
            Cell::String(value) => query.bind(value.clone()),
            Cell::Bytes(value) => query.bind(value.clone()),
            Cell::Uuid(value) => query.bind(*value),
            Cell::Json(value) => query.bind(value.clone()),
            Cell::Date(value) => query.bind(*value),
            Cell::Time(value) => query.bind(*value),
            Cell::TimeStamp(value) => query.bind(*value),
            Cell::TimeStampTz(value) => query.bind(*value),
        }
    }
}

/// Decodes an optional value and wraps it in the given variant, with SQL
/// NULL mapping to [`Cell::Null`].
fn decode<'r, T, F>(row: &'r PgRow, index: usize, variant: F) -> MigResult<Cell>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    F: FnOnce(T) -> Cell,
{
    let value: Option<T> = row.try_get(index).map_err(|err| {
        mig_error!(ErrorKind::InvalidData, "Failed to decode column value", err)
    })?;

    Ok(value.map_or(Cell::Null, variant))
}

/// Binds a typed SQL NULL for the given destination column type.
fn bind_null<'q>(
    query: Query<'q, Postgres, PgArguments>,
    type_name: &str,
) -> Query<'q, Postgres, PgArguments> {
    match type_name {
        "BOOL" => query.bind(None::<bool>),
        "INT2" => query.bind(None::<i16>),
        "INT4" => query.bind(None::<i32>),
        "INT8" => query.bind(None::<i64>),
        "FLOAT4" => query.bind(None::<f32>),
        "FLOAT8" => query.bind(None::<f64>),
        "NUMERIC" => query.bind(None::<Decimal>),
        "BYTEA" => query.bind(None::<Vec<u8>>),
        "UUID" => query.bind(None::<Uuid>),
        "JSON" | "JSONB" => query.bind(None::<serde_json::Value>),
        "DATE" => query.bind(None::<NaiveDate>),
        "TIME" => query.bind(None::<NaiveTime>),
        "TIMESTAMP" => query.bind(None::<NaiveDateTime>),
        "TIMESTAMPTZ" => query.bind(None::<DateTime<Utc>>),
        _ => query.bind(None::<String>),
    }
}

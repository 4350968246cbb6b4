use crate::types::Cell;

/// One column of a fetched batch.
///
/// The Postgres type name is kept alongside the column name because rows
/// are dynamic: it picks the decode arm when reading and types the bound
/// placeholder when a [`Cell::Null`] is written back.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name as reported by the database.
    pub name: String,
    /// Uppercase Postgres type name, e.g. `INT8` or `TIMESTAMPTZ`.
    pub type_name: String,
}

/// A complete row of data from a database table.
///
/// Values are ordered to match the owning batch's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Column values in batch column order.
    pub values: Vec<Cell>,
}

impl TableRow {
    /// Creates a new table row with the given cell values.
    pub fn new(values: Vec<Cell>) -> Self {
        Self { values }
    }
}

/// A batch of rows fetched from one table, with the column layout shared
/// by every row in the batch.
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    /// Column layout for all rows of the batch.
    pub columns: Vec<Column>,
    /// The fetched rows.
    pub rows: Vec<TableRow>,
}

impl RowBatch {
    /// Returns true when the batch carries no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

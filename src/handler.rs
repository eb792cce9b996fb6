//! The SQL capability a [`Request`](crate::Request) runs against.
//!
//! A [`Handler`] prepares statements; it is implemented for `&MySqlPool` and
//! `&mut MySqlConnection` (so a transaction is used through `&mut *tx`), and
//! can be implemented for anything else able to hand back rows as
//! [`Cell`]s.

use async_trait::async_trait;

use crate::value::{Cell, Value};

/// Anything able to prepare a statement: a pool, a connection, a transaction.
#[async_trait]
pub trait Handler: Send {
    async fn prepare<'a>(&'a mut self, query: &str) -> crate::Result<Box<dyn Statement + 'a>>;
}

/// A prepared statement, owned by the operation that prepared it.
#[async_trait]
pub trait Statement: Send {
    /// Runs the statement and returns a cursor over the resulting rows.
    async fn query(&mut self, args: &[Value]) -> crate::Result<Box<dyn Rows>>;

    /// Runs the statement and returns its first row.
    async fn query_row(&mut self, args: &[Value]) -> crate::Result<Box<dyn Row>>;

    async fn exec(&mut self, args: &[Value]) -> crate::Result<ExecResult>;

    /// Releases the statement.
    async fn close(self: Box<Self>) -> crate::Result<()>;
}

/// Cursor over the rows of a result set.
#[async_trait]
pub trait Rows: Send {
    /// Advances to the next row, returning `false` once the rows are exhausted.
    async fn next(&mut self) -> crate::Result<bool>;

    /// Copies the current row's columns into `cells`.
    ///
    /// Fails when `cells` doesn't have exactly one entry per column.
    fn scan(&mut self, cells: &mut [Cell]) -> crate::Result<()>;

    async fn close(self: Box<Self>) -> crate::Result<()>;
}

/// The single row of a `query_row` call.
pub trait Row: Send {
    /// Copies the row's columns into `cells`; fails when there is no row.
    fn scan(self: Box<Self>, cells: &mut [Cell]) -> crate::Result<()>;
}

/// Checks that a row of `columns` columns fills exactly `cells` cells.
///
/// [`Rows::scan`] and [`Row::scan`] implementations call this before copying.
pub fn check_width(cells: usize, columns: usize) -> crate::Result<()> {
    if cells != columns {
        return Err(crate::Error::ColumnCount {
            expected: cells,
            found: columns,
        });
    }
    Ok(())
}

/// Outcome of an `exec`, as reported by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

impl From<sqlx::mysql::MySqlQueryResult> for ExecResult {
    fn from(result: sqlx::mysql::MySqlQueryResult) -> Self {
        Self {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        }
    }
}

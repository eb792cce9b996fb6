//! [`Handler`] implementations for MySQL through SQLx.
//!
//! Statements are prepared with [`Executor::prepare`] and run through the
//! binary protocol; rows are fetched eagerly and decoded into [`Cell`]s when
//! scanned:
//!
//! | MySQL type | Cell |
//! |---|---|
//! | `TINYINT` .. `BIGINT`, `YEAR`, `BOOLEAN` | [`Cell::Int64`] |
//! | `FLOAT`, `DOUBLE` | [`Cell::Float64`] |
//! | `DATE`, `DATETIME`, `TIMESTAMP` | [`Cell::Timestamp`] (read as UTC, `DATE` at midnight) |
//! | `TIME` | [`Cell::Bytes`] (`HH:MM:SS[.fraction]`) |
//! | character, binary, `DECIMAL`, `JSON`, `ENUM`, `SET`, `BIT` | [`Cell::Bytes`] |
//! | `NULL` | [`Cell::Null`] |
//!
//! Any other type fails with [`Error::UnsupportedCell`]. Unsigned values above
//! `i64::MAX` and `TIME` values outside a single day fail to decode.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlRow, MySqlStatement};
use sqlx::query::Query;
use sqlx::{Column as _, Executor, MySql, MySqlPool, Row as _, Statement as _, TypeInfo as _};

use crate::error::Error;
use crate::handler::{check_width, ExecResult, Handler, Row, Rows, Statement};
use crate::value::{Cell, Value};

/// Type alias for SQLx Query with MySQL arguments
type Q<'q> = Query<'q, MySql, MySqlArguments>;

#[async_trait]
impl<'p> Handler for &'p MySqlPool {
    async fn prepare<'a>(&'a mut self, query: &str) -> crate::Result<Box<dyn Statement + 'a>> {
        let pool: &'p MySqlPool = *self;
        let statement = Executor::prepare(pool, query).await?;
        Ok(Box::new(PreparedStatement {
            target: Target::Pool(pool),
            statement: sqlx::Statement::to_owned(&statement),
        }))
    }
}

#[async_trait]
impl<'c> Handler for &'c mut MySqlConnection {
    async fn prepare<'a>(&'a mut self, query: &str) -> crate::Result<Box<dyn Statement + 'a>> {
        let conn: &'a mut MySqlConnection = &mut **self;
        let statement = Executor::prepare(&mut *conn, query).await?;
        let statement = sqlx::Statement::to_owned(&statement);
        Ok(Box::new(PreparedStatement {
            target: Target::Connection(conn),
            statement,
        }))
    }
}

enum Target<'a> {
    Pool(&'a MySqlPool),
    Connection(&'a mut MySqlConnection),
}

struct PreparedStatement<'a> {
    target: Target<'a>,
    statement: MySqlStatement<'static>,
}

fn bound<'q>(statement: &'q MySqlStatement<'static>, args: &[Value]) -> Q<'q> {
    args.iter().fold(statement.query(), bind)
}

fn bind<'q>(q: Q<'q>, value: &Value) -> Q<'q> {
    match value.clone() {
        Value::Null => q.bind(None::<String>),
        Value::Bytes(bytes) => q.bind(bytes),
        Value::Text(text) => q.bind(text),
        Value::Bool(b) => q.bind(b),
        Value::Int64(i) => q.bind(i),
        Value::Float64(f) => q.bind(f),
        Value::Timestamp(ts) => q.bind(ts),
    }
}

#[async_trait]
impl Statement for PreparedStatement<'_> {
    async fn query(&mut self, args: &[Value]) -> crate::Result<Box<dyn Rows>> {
        let q = bound(&self.statement, args);
        let rows = match &mut self.target {
            Target::Pool(pool) => q.fetch_all(*pool).await?,
            Target::Connection(conn) => q.fetch_all(&mut **conn).await?,
        };
        Ok(Box::new(MySqlRows {
            rows: rows.into_iter(),
            current: None,
        }))
    }

    async fn query_row(&mut self, args: &[Value]) -> crate::Result<Box<dyn Row>> {
        let q = bound(&self.statement, args);
        let row = match &mut self.target {
            Target::Pool(pool) => q.fetch_optional(*pool).await?,
            Target::Connection(conn) => q.fetch_optional(&mut **conn).await?,
        };
        Ok(Box::new(MySqlSingleRow(row)))
    }

    async fn exec(&mut self, args: &[Value]) -> crate::Result<ExecResult> {
        let q = bound(&self.statement, args);
        let result = match &mut self.target {
            Target::Pool(pool) => q.execute(*pool).await?,
            Target::Connection(conn) => q.execute(&mut **conn).await?,
        };
        Ok(result.into())
    }

    // SQLx keeps prepared statements in the connection's statement cache.
    async fn close(self: Box<Self>) -> crate::Result<()> {
        Ok(())
    }
}

struct MySqlRows {
    rows: std::vec::IntoIter<MySqlRow>,
    current: Option<MySqlRow>,
}

#[async_trait]
impl Rows for MySqlRows {
    async fn next(&mut self) -> crate::Result<bool> {
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn scan(&mut self, cells: &mut [Cell]) -> crate::Result<()> {
        let row = self.current.as_ref().ok_or(sqlx::Error::RowNotFound)?;
        decode_row(row, cells)
    }

    async fn close(self: Box<Self>) -> crate::Result<()> {
        Ok(())
    }
}

struct MySqlSingleRow(Option<MySqlRow>);

impl Row for MySqlSingleRow {
    fn scan(self: Box<Self>, cells: &mut [Cell]) -> crate::Result<()> {
        let row = self.0.ok_or(sqlx::Error::RowNotFound)?;
        decode_row(&row, cells)
    }
}

fn decode_row(row: &MySqlRow, cells: &mut [Cell]) -> crate::Result<()> {
    check_width(cells.len(), row.len())?;
    for (index, cell) in cells.iter_mut().enumerate() {
        *cell = decode_cell(row, index)?;
    }
    Ok(())
}

fn decode_cell(row: &MySqlRow, index: usize) -> crate::Result<Cell> {
    let cell = match decoding(row.column(index).type_info().name())? {
        Decoding::Null => Cell::Null,
        Decoding::Signed => row
            .try_get_unchecked::<Option<i64>, _>(index)?
            .map_or(Cell::Null, Cell::Int64),
        Decoding::Unsigned => match row.try_get_unchecked::<Option<u64>, _>(index)? {
            Some(value) => unsigned_cell(value, index)?,
            None => Cell::Null,
        },
        Decoding::Float => row
            .try_get_unchecked::<Option<f32>, _>(index)?
            .map_or(Cell::Null, float_cell),
        Decoding::Double => row
            .try_get_unchecked::<Option<f64>, _>(index)?
            .map_or(Cell::Null, Cell::Float64),
        Decoding::DateTime => row
            .try_get_unchecked::<Option<NaiveDateTime>, _>(index)?
            .map_or(Cell::Null, |ts| Cell::Timestamp(ts.and_utc())),
        Decoding::Date => row
            .try_get_unchecked::<Option<NaiveDate>, _>(index)?
            .map_or(Cell::Null, date_cell),
        Decoding::Time => row
            .try_get_unchecked::<Option<NaiveTime>, _>(index)?
            .map_or(Cell::Null, time_cell),
        Decoding::Bytes => row
            .try_get_unchecked::<Option<Vec<u8>>, _>(index)?
            .map_or(Cell::Null, Cell::Bytes),
    };
    Ok(cell)
}

/// How a column is read, decided from its MySQL type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoding {
    Null,
    Signed,
    Unsigned,
    Float,
    Double,
    DateTime,
    Date,
    Time,
    Bytes,
}

const INTEGER_TYPES: &[&str] = &[
    "BOOLEAN",
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "BIGINT",
    "YEAR",
];

const BYTES_TYPES: &[&str] = &[
    "CHAR",
    "VARCHAR",
    "TINYTEXT",
    "TEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "BINARY",
    "VARBINARY",
    "TINYBLOB",
    "BLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
    "DECIMAL",
    "JSON",
    "ENUM",
    "SET",
    "BIT",
];

fn decoding(type_name: &str) -> crate::Result<Decoding> {
    let (base, unsigned) = match type_name.strip_suffix(" UNSIGNED") {
        Some(base) => (base, true),
        None => (type_name, false),
    };
    let decoding = match base {
        "NULL" => Decoding::Null,
        int if INTEGER_TYPES.contains(&int) && unsigned => Decoding::Unsigned,
        int if INTEGER_TYPES.contains(&int) => Decoding::Signed,
        "FLOAT" => Decoding::Float,
        "DOUBLE" => Decoding::Double,
        "DATETIME" | "TIMESTAMP" => Decoding::DateTime,
        "DATE" => Decoding::Date,
        "TIME" => Decoding::Time,
        bytes if BYTES_TYPES.contains(&bytes) => Decoding::Bytes,
        _ => return Err(Error::UnsupportedCell(type_name.to_owned())),
    };
    Ok(decoding)
}

fn unsigned_cell(value: u64, index: usize) -> crate::Result<Cell> {
    let value = i64::try_from(value).map_err(|err| sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(err),
    })?;
    Ok(Cell::Int64(value))
}

fn float_cell(value: f32) -> Cell {
    Cell::Float64(f64::from(value))
}

fn date_cell(date: NaiveDate) -> Cell {
    Cell::Timestamp(date.and_time(NaiveTime::MIN).and_utc())
}

// Same text MySQL prints for the value, fractional digits only when present.
fn time_cell(time: NaiveTime) -> Cell {
    Cell::Bytes(time.format("%H:%M:%S%.f").to_string().into_bytes())
}

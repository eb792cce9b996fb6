use crate::builder::{build_insert, QueryParts};
use crate::column::{Column, ColumnList};
use crate::error::Error;
use crate::handler::{ExecResult, Handler, Row, Rows, Statement};
use crate::record::{self, Record, RecordList};
use crate::scan;
use crate::value::Value;

const RECORD: &str = "&mut record";
const RECORDS: &str = "&mut Vec<record>";
const FIELD: &str = "&mut field";
const FIELDS: &str = "list of &mut field";
const COLUMN: &str = "&mut Vec<field>";

/// Where the rows of a query are scanned into.
///
/// Each variant matches one `fetch_*` operation of [`Request`]; calling an
/// operation with another variant fails with [`Error::ShapeMismatch`] before
/// any SQL is issued.
pub enum Dest<'a> {
    /// Declared fields of one record, from a single row
    Record(&'a mut dyn Record),
    /// One new record per row
    Records(&'a mut dyn RecordList),
    /// Single column of a single row
    Field(&'a mut dyn Column),
    /// Each column of a single row, in order
    Fields(Vec<&'a mut dyn Column>),
    /// Single column of every row
    Column(&'a mut dyn ColumnList),
}

impl<'a> Dest<'a> {
    pub fn record<R: Record>(record: &'a mut R) -> Self {
        Dest::Record(record)
    }

    pub fn records<R: Record + Default>(records: &'a mut Vec<R>) -> Self {
        Dest::Records(records)
    }

    pub fn field<T: Column>(field: &'a mut T) -> Self {
        Dest::Field(field)
    }

    pub fn fields(fields: Vec<&'a mut dyn Column>) -> Self {
        Dest::Fields(fields)
    }

    pub fn column<T: Column + Default>(column: &'a mut Vec<T>) -> Self {
        Dest::Column(column)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Dest::Record(_) => RECORD,
            Dest::Records(_) => RECORDS,
            Dest::Field(_) => FIELD,
            Dest::Fields(_) => FIELDS,
            Dest::Column(_) => COLUMN,
        }
    }
}

/// A query bound to a [`Handler`] and, for the `fetch_*` operations, to a
/// [`Dest`] receiving the scanned rows.
///
/// Every operation prepares the query, runs it and releases the prepared
/// statement before returning, on success as on error.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use sqlx_requests::{record, Dest, Request};
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct User {
///         #[db = "id"]
///         pub id: i64,
///         #[db = "name"]
///         pub name: String,
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let mut users: Vec<User> = Vec::new();
/// Request::new(&pool)
///     .with_query("SELECT id, name FROM users WHERE age >= ?")
///     .with_dest(Dest::records(&mut users))
///     .fetch_records(&[18.into()])
///     .await?;
/// println!("Found {} users", users.len());
/// # Ok(())
/// # }
/// ```
pub struct Request<'a, H> {
    pub handler: H,
    pub query: QueryParts,
    pub dest: Option<Dest<'a>>,
}

impl<'a, H> Request<'a, H>
where
    H: Handler,
{
    /// Creates a request on a handler, with an empty query and no destination.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            query: QueryParts::default(),
            dest: None,
        }
    }

    pub fn with_query<T>(mut self, query: T) -> Self
    where
        T: Into<String>,
    {
        self.query.query = query.into();
        self
    }

    pub fn with_parts(mut self, parts: QueryParts) -> Self {
        self.query = parts;
        self
    }

    pub fn with_dest(mut self, dest: Dest<'a>) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Prepares the rendered query. The caller owns the statement and must
    /// [`close`](Statement::close) it.
    pub async fn prepare(&mut self) -> crate::Result<Box<dyn Statement + '_>> {
        prepare(&mut self.handler, &self.query).await
    }

    /// Runs the query and returns the cursor over its rows.
    pub async fn rows(&mut self, args: &[Value]) -> crate::Result<Box<dyn Rows>> {
        query_rows(&mut self.handler, &self.query, args).await
    }

    /// Runs the query and returns its first row.
    pub async fn row(&mut self, args: &[Value]) -> crate::Result<Box<dyn Row>> {
        query_row(&mut self.handler, &self.query, args).await
    }

    /// Runs a query which doesn't return rows.
    pub async fn exec(&mut self, args: &[Value]) -> crate::Result<ExecResult> {
        let mut stmt = prepare(&mut self.handler, &self.query).await?;
        let result = stmt.exec(args).await;
        release(stmt, result).await
    }

    /// Scans a single row into the record destination.
    ///
    /// Columns are stored by position into the record's declared fields.
    pub async fn fetch_record(&mut self, args: &[Value]) -> crate::Result<()> {
        let Request {
            ref mut handler,
            ref query,
            ref mut dest,
        } = *self;
        let record = match dest {
            None => return Err(Error::NoDestination),
            Some(Dest::Record(record)) => record,
            Some(other) => return Err(shape_mismatch(RECORD, other)),
        };

        let row = query_row(handler, query, args).await?;
        scan::scan_record(row, &mut **record)
    }

    /// Scans every row into a new record appended to the list destination.
    pub async fn fetch_records(&mut self, args: &[Value]) -> crate::Result<()> {
        let Request {
            ref mut handler,
            ref query,
            ref mut dest,
        } = *self;
        let records = match dest {
            None => return Err(Error::NoDestination),
            Some(Dest::Records(records)) => records,
            Some(other) => return Err(shape_mismatch(RECORDS, other)),
        };

        let mut rows = query_rows(handler, query, args).await?;
        let scanned = scan::scan_records(rows.as_mut(), &mut **records).await;
        let count = close_rows(rows, scanned).await?;
        tracing::debug!(rows = count, "scanned records");
        Ok(())
    }

    /// Scans the single column of a single row into the field destination.
    pub async fn fetch_field(&mut self, args: &[Value]) -> crate::Result<()> {
        let Request {
            ref mut handler,
            ref query,
            ref mut dest,
        } = *self;
        let field = match dest {
            None => return Err(Error::NoDestination),
            Some(Dest::Field(field)) => field,
            Some(other) => return Err(shape_mismatch(FIELD, other)),
        };

        let row = query_row(handler, query, args).await?;
        scan::scan_field(row, &mut **field)
    }

    /// Scans the columns of a single row into the positional field destination.
    ///
    /// The number of handles sets the number of columns read from the row.
    pub async fn fetch_fields(&mut self, args: &[Value]) -> crate::Result<()> {
        let Request {
            ref mut handler,
            ref query,
            ref mut dest,
        } = *self;
        let fields = match dest {
            None => return Err(Error::NoDestination),
            Some(Dest::Fields(fields)) => fields,
            Some(other) => return Err(shape_mismatch(FIELDS, other)),
        };

        let row = query_row(handler, query, args).await?;
        scan::scan_fields(row, fields)
    }

    /// Scans the single column of every row into the column destination.
    pub async fn fetch_column(&mut self, args: &[Value]) -> crate::Result<()> {
        let Request {
            ref mut handler,
            ref query,
            ref mut dest,
        } = *self;
        let column = match dest {
            None => return Err(Error::NoDestination),
            Some(Dest::Column(column)) => column,
            Some(other) => return Err(shape_mismatch(COLUMN, other)),
        };

        let mut rows = query_rows(handler, query, args).await?;
        let scanned = scan::scan_column(rows.as_mut(), &mut **column).await;
        let count = close_rows(rows, scanned).await?;
        tracing::debug!(rows = count, "scanned column");
        Ok(())
    }

    /// Inserts one record into `query.table`.
    ///
    /// The `statement`, `set` and `condition` fragments are overwritten with
    /// the insert shape derived from the record's columns.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] if `record` isn't a record
    /// - [`Error::EmptySchema`] if the record has no column to insert
    pub async fn insert_record(&mut self, record: &dyn Column) -> crate::Result<ExecResult> {
        let record = record.as_record().ok_or(Error::ShapeMismatch {
            expected: "a record",
            found: record.type_name(),
        })?;
        let columns = record::columns(record.record_name(), record.fields())?;
        build_insert(&mut self.query, &columns);

        let mut stmt = prepare(&mut self.handler, &self.query).await?;
        let result = exec_record(stmt.as_mut(), record).await;
        release(stmt, result).await
    }

    /// Inserts a slice of records into `query.table`, in order, through a
    /// single prepared statement.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] if `T` isn't a record type
    /// - [`Error::EmptyInput`] if `records` is empty
    /// - [`Error::EmptySchema`] if the record type has no column to insert
    pub async fn insert_records<T>(&mut self, records: &[T]) -> crate::Result<Vec<ExecResult>>
    where
        T: Column,
    {
        let fields = T::nested().ok_or(Error::ShapeMismatch {
            expected: "a slice of records",
            found: std::any::type_name::<T>(),
        })?;
        let first = records.first().ok_or(Error::EmptyInput)?;
        let columns = record::columns(first.type_name(), fields)?;
        build_insert(&mut self.query, &columns);

        let mut stmt = prepare(&mut self.handler, &self.query).await?;
        let result = exec_records(stmt.as_mut(), records).await;
        let results = release(stmt, result).await?;
        tracing::debug!(records = results.len(), "inserted records");
        Ok(results)
    }
}

fn shape_mismatch(expected: &'static str, dest: &Dest<'_>) -> Error {
    Error::ShapeMismatch {
        expected,
        found: dest.kind(),
    }
}

async fn prepare<'h, H>(
    handler: &'h mut H,
    query: &QueryParts,
) -> crate::Result<Box<dyn Statement + 'h>>
where
    H: Handler,
{
    let sql = query.to_string();
    tracing::debug!(query = %sql, "preparing statement");
    handler.prepare(&sql).await
}

async fn query_rows<H>(
    handler: &mut H,
    query: &QueryParts,
    args: &[Value],
) -> crate::Result<Box<dyn Rows>>
where
    H: Handler,
{
    let mut stmt = prepare(handler, query).await?;
    let rows = stmt.query(args).await;
    release(stmt, rows).await
}

async fn query_row<H>(
    handler: &mut H,
    query: &QueryParts,
    args: &[Value],
) -> crate::Result<Box<dyn Row>>
where
    H: Handler,
{
    let mut stmt = prepare(handler, query).await?;
    let row = stmt.query_row(args).await;
    release(stmt, row).await
}

async fn exec_record(
    stmt: &mut (dyn Statement + '_),
    record: &dyn Record,
) -> crate::Result<ExecResult> {
    let values = record::values(record)?;
    stmt.exec(&values).await
}

async fn exec_records<T>(
    stmt: &mut (dyn Statement + '_),
    records: &[T],
) -> crate::Result<Vec<ExecResult>>
where
    T: Column,
{
    let mut results = Vec::with_capacity(records.len());
    for item in records {
        let record = item.as_record().ok_or(Error::ShapeMismatch {
            expected: "a record",
            found: item.type_name(),
        })?;
        results.push(exec_record(stmt, record).await?);
    }
    Ok(results)
}

/// Closes the statement, keeping the operation's own result.
async fn release<T>(stmt: Box<dyn Statement + '_>, result: crate::Result<T>) -> crate::Result<T> {
    if let Err(err) = stmt.close().await {
        tracing::warn!(error = %err, "failed to close prepared statement");
    }
    result
}

async fn close_rows<T>(rows: Box<dyn Rows>, result: crate::Result<T>) -> crate::Result<T> {
    if let Err(err) = rows.close().await {
        tracing::warn!(error = %err, "failed to close rows");
    }
    result
}

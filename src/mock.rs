//! In-memory handler used by the unit tests, recording every call it receives.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::handler::{check_width, ExecResult, Handler, Row, Rows, Statement};
use crate::value::{Cell, Value};

crate::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Basic {
        #[db = "id"]
        pub id: String,
        #[db = "createdAt"]
        pub created_at: String,
    }
}

crate::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Entry {
        #[db = "id"]
        pub id: String,
        #[db = "createdAt"]
        pub created_at: DateTime<Utc>,
    }
}

crate::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct TestRec {
        #[req = "include"]
        pub basic: Basic,
        #[db = "ptr"]
        pub ptr: Option<bool>,
        #[db = "nilptr"]
        pub nil_ptr: Option<bool>,
        #[db = "-"]
        pub ignored: bool,
        pub no_tag: bool,
    }
}

crate::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct EmptyRec {
        pub no_tag: bool,
        #[db = "-"]
        pub ignored: i64,
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap()
}

pub fn text(s: &str) -> Cell {
    Cell::Bytes(s.as_bytes().to_vec())
}

pub fn rows(rows: Vec<Vec<Cell>>) -> Box<dyn Rows> {
    Box::new(MockRows {
        rows: rows.into_iter(),
        current: None,
        db: MockDb::new(),
    })
}

pub fn single_row(cells: Vec<Cell>) -> Box<dyn Row> {
    Box::new(MockRow(Some(cells)))
}

pub fn no_row() -> Box<dyn Row> {
    Box::new(MockRow(None))
}

/// Everything the mock saw, in order.
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub prepared: Vec<String>,
    pub closed: usize,
    pub queries: Vec<Vec<Value>>,
    pub execs: Vec<Vec<Value>>,
    pub rows_opened: usize,
    pub rows_closed: usize,
}

#[derive(Debug, Default)]
struct State {
    events: Events,
    rows: Vec<Vec<Cell>>,
    fail_prepare: bool,
    fail_query: bool,
    fail_exec_at: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MockDb {
    state: Arc<Mutex<State>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<Cell>>) -> Self {
        let db = Self::new();
        db.lock().rows = rows;
        db
    }

    pub fn failing_prepare(self) -> Self {
        self.lock().fail_prepare = true;
        self
    }

    pub fn failing_query(self) -> Self {
        self.lock().fail_query = true;
        self
    }

    /// Makes the `n`-th exec (0-based) fail.
    pub fn failing_exec_at(self, n: usize) -> Self {
        self.lock().fail_exec_at = Some(n);
        self
    }

    pub fn events(&self) -> Events {
        self.lock().events.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn mock_error(what: &str) -> crate::Error {
    sqlx::Error::Protocol(format!("this would produce an error: {what}")).into()
}

#[async_trait]
impl Handler for MockDb {
    async fn prepare<'a>(&'a mut self, query: &str) -> crate::Result<Box<dyn Statement + 'a>> {
        let mut state = self.lock();
        state.events.prepared.push(query.to_owned());
        if state.fail_prepare {
            return Err(mock_error("prepare"));
        }
        drop(state);
        Ok(Box::new(MockStatement { db: self.clone() }))
    }
}

struct MockStatement {
    db: MockDb,
}

#[async_trait]
impl Statement for MockStatement {
    async fn query(&mut self, args: &[Value]) -> crate::Result<Box<dyn Rows>> {
        let mut state = self.db.lock();
        state.events.queries.push(args.to_vec());
        if state.fail_query {
            return Err(mock_error("query"));
        }
        state.events.rows_opened += 1;
        let rows = state.rows.clone();
        drop(state);
        Ok(Box::new(MockRows {
            rows: rows.into_iter(),
            current: None,
            db: self.db.clone(),
        }))
    }

    async fn query_row(&mut self, args: &[Value]) -> crate::Result<Box<dyn Row>> {
        let mut state = self.db.lock();
        state.events.queries.push(args.to_vec());
        if state.fail_query {
            return Err(mock_error("query"));
        }
        Ok(Box::new(MockRow(state.rows.first().cloned())))
    }

    async fn exec(&mut self, args: &[Value]) -> crate::Result<ExecResult> {
        let mut state = self.db.lock();
        let n = state.events.execs.len();
        state.events.execs.push(args.to_vec());
        if state.fail_exec_at == Some(n) {
            return Err(mock_error("exec"));
        }
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: n as u64 + 1,
        })
    }

    async fn close(self: Box<Self>) -> crate::Result<()> {
        self.db.lock().events.closed += 1;
        Ok(())
    }
}

struct MockRows {
    rows: std::vec::IntoIter<Vec<Cell>>,
    current: Option<Vec<Cell>>,
    db: MockDb,
}

#[async_trait]
impl Rows for MockRows {
    async fn next(&mut self) -> crate::Result<bool> {
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn scan(&mut self, cells: &mut [Cell]) -> crate::Result<()> {
        let row = self.current.as_ref().ok_or(sqlx::Error::RowNotFound)?;
        copy_row(row, cells)
    }

    async fn close(self: Box<Self>) -> crate::Result<()> {
        self.db.lock().events.rows_closed += 1;
        Ok(())
    }
}

struct MockRow(Option<Vec<Cell>>);

impl Row for MockRow {
    fn scan(self: Box<Self>, cells: &mut [Cell]) -> crate::Result<()> {
        let row = self.0.ok_or(sqlx::Error::RowNotFound)?;
        copy_row(&row, cells)
    }
}

fn copy_row(row: &[Cell], cells: &mut [Cell]) -> crate::Result<()> {
    check_width(cells.len(), row.len())?;
    cells.clone_from_slice(row);
    Ok(())
}


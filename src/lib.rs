//! # sqlx-requests
//!
//! Run parameterized SQL and scan the results into caller-provided
//! destinations, or insert records whose column list is derived from their
//! declared fields.
//!
//! ## Features
//!
//! - **Declared Records**: The [`record!`] macro declares a struct together with
//!   its column mapping (`#[db = "name"]`, `#[db = "-"]`, `#[req = "include"]`)
//! - **Five Destination Shapes**: one record, a list of records, one field, a
//!   positional list of fields, or a list of single-column values
//! - **Positional Mapping**: the i-th selected column lands in the i-th declared field
//! - **Statement Hygiene**: every prepared statement is closed before an operation
//!   returns, on success and on failure
//! - **Pluggable Backend**: works with `&MySqlPool`, `&mut MySqlConnection` (and so
//!   transactions), or anything implementing [`Handler`]
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio", "chrono"] }
//! sqlx-requests = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Fetching Records
//!
//! ```rust,no_run
//! use chrono::{DateTime, Utc};
//! use sqlx::MySqlPool;
//! use sqlx_requests::{record, Dest, Request};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct User {
//!         #[db = "id"]
//!         pub id: i64,
//!         #[db = "name"]
//!         pub name: String,
//!         #[db = "createdAt"]
//!         pub created_at: DateTime<Utc>,
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/test").await?;
//!
//! let mut users: Vec<User> = Vec::new();
//! Request::new(&pool)
//!     .with_query("SELECT id, name, createdAt FROM users WHERE age >= ?")
//!     .with_dest(Dest::records(&mut users))
//!     .fetch_records(&[18.into()])
//!     .await?;
//! for user in &users {
//!     println!("{}: {}", user.id, user.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Single Values
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use sqlx_requests::{Column, Dest, Request};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/test").await?;
//! let mut count: i64 = 0;
//! Request::new(&pool)
//!     .with_query("SELECT COUNT(*) FROM users")
//!     .with_dest(Dest::field(&mut count))
//!     .fetch_field(&[])
//!     .await?;
//!
//! let mut name = String::new();
//! let mut email: Option<String> = None;
//! let fields: Vec<&mut dyn Column> = vec![&mut name as &mut dyn Column, &mut email];
//! Request::new(&pool)
//!     .with_query("SELECT name, email FROM users WHERE id = ?")
//!     .with_dest(Dest::fields(fields))
//!     .fetch_fields(&[42.into()])
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Inserting Records in a Transaction
//!
//! ```rust,no_run
//! use sqlx::{MySql, MySqlPool, Transaction};
//! use sqlx_requests::{record, QueryParts, Request};
//!
//! record! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Account {
//!         #[db = "name"]
//!         pub name: String,
//!         #[db = "balance"]
//!         pub balance: i64,
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/test").await?;
//! let mut tx: Transaction<MySql> = pool.begin().await?;
//!
//! let accounts = vec![
//!     Account { name: "Alice".into(), balance: 100 },
//!     Account { name: "Bob".into(), balance: 50 },
//! ];
//! let results = Request::new(&mut *tx)
//!     .with_parts(QueryParts::table("accounts"))
//!     .insert_records(&accounts)
//!     .await?;
//! println!("Inserted {} accounts", results.len());
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Prepare**: the query is rendered and prepared on the handler
//! 2. **Run**: the statement runs with positional `?` arguments
//! 3. **Scan**: each row is read into raw [`Cell`]s, then each cell is stored
//!    into its destination field according to the field's type
//! 4. **Release**: the statement is closed; a close failure is logged and never
//!    replaces the operation's own result
//!
//! ## Limitations
//!
//! - Currently only ships a MySQL [`Handler`]
//! - Columns map to fields by position, not by name
//! - Embedded (`#[req = "include"]`) fields are flattened on insert but can't be scanned
//! - `TIME` columns read as `HH:MM:SS` text; spatial types such as `GEOMETRY` are rejected
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod builder;
pub mod column;
pub mod error;
pub mod handler;
pub mod mysql;
pub mod record;
pub mod request;
pub mod scan;
pub mod store;
pub mod value;

#[cfg(test)]
mod mock;

pub use builder::QueryParts;
pub use column::{Column, ColumnList, ReadOnly, Slot};
pub use error::{Error, Result};
pub use handler::{ExecResult, Handler, Row, Rows, Statement};
pub use record::{FieldDef, Record, RecordList};
pub use request::{Dest, Request};
pub use value::{Cell, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::record;
    pub use crate::{Column, Dest, ExecResult, QueryParts, ReadOnly, Record, Request, Value};
}

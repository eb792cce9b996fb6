use std::fmt;

/// The query of a [`Request`](crate::Request): either a whole query string, or
/// labelled fragments concatenated at render time.
///
/// # Examples
///
/// ```
/// use sqlx_requests::builder::QueryParts;
///
/// let parts = QueryParts {
///     statement: "UPDATE".into(),
///     table: "user".into(),
///     set: "SET id = '12345'".into(),
///     condition: "WHERE name = 'test'".into(),
///     ..QueryParts::default()
/// };
/// assert_eq!(parts.to_string(), "UPDATE user SET id = '12345' WHERE name = 'test'");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParts {
    /// Full query string; when not empty, the fragments are ignored
    pub query: String,
    pub statement: String,
    pub table: String,
    /// Optional
    pub set: String,
    /// Optional
    pub condition: String,
}

impl QueryParts {
    pub fn new<T>(query: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn table<T>(table: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for QueryParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.query.is_empty() {
            return f.write_str(&self.query);
        }
        write!(f, "{} {}", self.statement, self.table)?;
        for optional in [&self.set, &self.condition] {
            if !optional.is_empty() {
                write!(f, " {optional}")?;
            }
        }
        Ok(())
    }
}

/// Fills the fragments of an `INSERT INTO <table> (<columns>) VALUES (?, ...)`
/// query, one positional placeholder per column. The table is kept as is.
///
/// ```
/// use sqlx_requests::builder::{build_insert, QueryParts};
///
/// let mut parts = QueryParts::table("user");
/// build_insert(&mut parts, &["id", "name"]);
/// assert_eq!(parts.to_string(), "INSERT INTO user (id, name) VALUES (?, ?)");
/// ```
pub fn build_insert(parts: &mut QueryParts, columns: &[&str]) {
    parts.statement = "INSERT INTO".to_owned();
    parts.set = format!("({})", columns.join(", "));
    parts.condition = format!("VALUES ({})", vec!["?"; columns.len()].join(", "));
}

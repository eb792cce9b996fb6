use chrono::{DateTime, Utc};

/// A single column value as handed back by the driver.
///
/// Drivers map every column type they support onto one of these five
/// variants and reject the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    Bytes(Vec<u8>),
    Int64(i64),
    Float64(f64),
    Timestamp(DateTime<Utc>),
    #[default]
    Null,
}

impl Cell {
    /// Name of the variant, used in type mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Bytes(_) => "bytes",
            Cell::Int64(_) => "int64",
            Cell::Float64(_) => "float64",
            Cell::Timestamp(_) => "timestamp",
            Cell::Null => "null",
        }
    }
}

/// A positional argument bound to a prepared statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Timestamp(DateTime<Utc>),
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    String => Text,
    &str => Text,
    bool => Bool,
    i32 => Int64,
    i64 => Int64,
    f64 => Float64,
    DateTime<Utc> => Timestamp,
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

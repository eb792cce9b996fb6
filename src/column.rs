use chrono::{DateTime, Utc};

use crate::record::{FieldDef, Record};
use crate::value::Value;

/// A typed, mutable view of one destination field.
///
/// The type store pairs a [`Cell`](crate::Cell) with a slot to decide whether
/// the write is admissible.
#[derive(Debug)]
pub enum Slot<'a> {
    Bytes(&'a mut Vec<u8>),
    OptBytes(&'a mut Option<Vec<u8>>),
    Text(&'a mut String),
    OptText(&'a mut Option<String>),
    Bool(&'a mut bool),
    OptBool(&'a mut Option<bool>),
    Int64(&'a mut i64),
    OptInt64(&'a mut Option<i64>),
    Float64(&'a mut f64),
    OptFloat64(&'a mut Option<f64>),
    Timestamp(&'a mut DateTime<Utc>),
    OptTimestamp(&'a mut Option<DateTime<Utc>>),
    /// Field that can't be written through the handle.
    ReadOnly(&'static str),
    /// Field whose type is outside the scan vocabulary (embedded records).
    Other(&'static str),
}

impl Slot<'_> {
    /// Rust type name of the field behind the slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Bytes(_) => "Vec<u8>",
            Slot::OptBytes(_) => "Option<Vec<u8>>",
            Slot::Text(_) => "String",
            Slot::OptText(_) => "Option<String>",
            Slot::Bool(_) => "bool",
            Slot::OptBool(_) => "Option<bool>",
            Slot::Int64(_) => "i64",
            Slot::OptInt64(_) => "Option<i64>",
            Slot::Float64(_) => "f64",
            Slot::OptFloat64(_) => "Option<f64>",
            Slot::Timestamp(_) => "DateTime<Utc>",
            Slot::OptTimestamp(_) => "Option<DateTime<Utc>>",
            Slot::ReadOnly(name) | Slot::Other(name) => name,
        }
    }
}

/// A type that can live in a record field, be scanned into and be bound.
///
/// Implemented for the scan vocabulary (`Vec<u8>`, `String`, `bool`, `i64`,
/// `f64`, `DateTime<Utc>` and their `Option`s), for [`ReadOnly`], and by
/// [`record!`](crate::record) for every record type so that records can be
/// embedded in other records.
pub trait Column: Send {
    fn type_name(&self) -> &'static str;

    fn slot(&mut self) -> Slot<'_>;

    fn value(&self) -> crate::Result<Value>;

    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    /// Field list of the type when it is a record.
    fn nested() -> Option<&'static [FieldDef]>
    where
        Self: Sized,
    {
        None
    }
}

macro_rules! impl_column {
    ($ty:ty, $name:literal, $slot:ident, $opt:ident, $opt_name:literal, $value:ident) => {
        impl Column for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn slot(&mut self) -> Slot<'_> {
                Slot::$slot(self)
            }

            fn value(&self) -> crate::Result<Value> {
                Ok(Value::$value(self.clone()))
            }
        }

        impl Column for Option<$ty> {
            fn type_name(&self) -> &'static str {
                $opt_name
            }

            fn slot(&mut self) -> Slot<'_> {
                Slot::$opt(self)
            }

            fn value(&self) -> crate::Result<Value> {
                Ok(self.clone().map_or(Value::Null, Value::$value))
            }
        }
    };
}

impl_column!(Vec<u8>, "Vec<u8>", Bytes, OptBytes, "Option<Vec<u8>>", Bytes);
impl_column!(String, "String", Text, OptText, "Option<String>", Text);
impl_column!(bool, "bool", Bool, OptBool, "Option<bool>", Bool);
impl_column!(i64, "i64", Int64, OptInt64, "Option<i64>", Int64);
impl_column!(f64, "f64", Float64, OptFloat64, "Option<f64>", Float64);
impl_column!(
    DateTime<Utc>,
    "DateTime<Utc>",
    Timestamp,
    OptTimestamp,
    "Option<DateTime<Utc>>",
    Timestamp
);

/// A column that is bound on insert but never overwritten by a scan.
///
/// Scanning into it fails with [`Error::NotSettable`](crate::Error::NotSettable).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOnly<T>(pub T);

impl<T: Column> Column for ReadOnly<T> {
    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::ReadOnly(self.0.type_name())
    }

    fn value(&self) -> crate::Result<Value> {
        self.0.value()
    }
}

/// A growable list of columns, the target of a single-column scan over many rows.
pub trait ColumnList: Send {
    /// Appends a default element and returns it.
    fn push_default(&mut self) -> &mut dyn Column;
}

impl<T> ColumnList for Vec<T>
where
    T: Column + Default,
{
    fn push_default(&mut self) -> &mut dyn Column {
        let index = self.len();
        self.push(T::default());
        &mut self[index]
    }
}

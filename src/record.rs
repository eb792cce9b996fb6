//! Record descriptors: the static field metadata that drives scans and inserts.
//!
//! A record is a plain struct declared through [`record!`](crate::record).
//! The macro keeps the struct as written and generates a [`Record`]
//! implementation exposing, per declared field, its annotations and positional
//! access to the field itself.
//!
//! Two annotations are recognised:
//!
//! - `db`: the SQL column name. Missing or `"-"` leaves the field out of inserts.
//! - `req`: `"include"` on a record-typed field splices that record's columns
//!   in place of the field.

use crate::column::Column;
use crate::error::Error;
use crate::value::Value;

/// Annotation holding the SQL column name of a field.
pub const COLUMN_TAG: &str = "db";
/// Annotation marking an embedded record.
pub const EMBED_TAG: &str = "req";
/// `db` value leaving a field out.
pub const SKIP: &str = "-";
/// `req` value expanding an embedded record.
pub const INCLUDE: &str = "include";

/// Static descriptor of one declared record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub tags: &'static [(&'static str, &'static str)],
    /// Field list of the field's type, when that type is itself a record.
    pub nested: fn() -> Option<&'static [FieldDef]>,
}

impl FieldDef {
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| *value)
    }

    pub fn column(&self) -> Option<&'static str> {
        self.tag(COLUMN_TAG).filter(|name| *name != SKIP)
    }

    pub fn is_embedded(&self) -> bool {
        self.tag(EMBED_TAG) == Some(INCLUDE)
    }
}

/// A struct whose fields can be enumerated, read and written by position.
///
/// Positions follow declaration order and count every declared field,
/// skipped and embedded ones included.
pub trait Record: Send {
    fn record_name(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldDef];

    fn field(&self, index: usize) -> Option<&dyn Column>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Column>;

    fn schema() -> &'static [FieldDef]
    where
        Self: Sized;
}

/// A growable list of records, the target of a multi-row record scan.
pub trait RecordList: Send {
    fn element_fields(&self) -> &'static [FieldDef];

    /// Appends a default record and returns it.
    fn push_default(&mut self) -> &mut dyn Record;
}

impl<R> RecordList for Vec<R>
where
    R: Record + Default,
{
    fn element_fields(&self) -> &'static [FieldDef] {
        R::schema()
    }

    fn push_default(&mut self) -> &mut dyn Record {
        let index = self.len();
        self.push(R::default());
        &mut self[index]
    }
}

/// Ordered column names of a record type, embedded records expanded in place.
///
/// # Errors
///
/// Returns [`Error::EmptySchema`] when every field is skipped.
pub fn columns(
    record_name: &'static str,
    fields: &'static [FieldDef],
) -> crate::Result<Vec<&'static str>> {
    let mut names = Vec::new();
    collect_columns(fields, &mut names);
    if names.is_empty() {
        return Err(Error::EmptySchema(record_name));
    }
    Ok(names)
}

fn collect_columns(fields: &'static [FieldDef], names: &mut Vec<&'static str>) {
    for def in fields {
        if def.is_embedded() {
            if let Some(nested) = (def.nested)() {
                collect_columns(nested, names);
                continue;
            }
        }
        if let Some(name) = def.column() {
            names.push(name);
        }
    }
}

/// Positional values of a record, in the same order as [`columns`].
pub fn values(record: &dyn Record) -> crate::Result<Vec<Value>> {
    let mut values = Vec::new();
    collect_values(record, &mut values)?;
    Ok(values)
}

fn collect_values(record: &dyn Record, values: &mut Vec<Value>) -> crate::Result<()> {
    for (index, def) in record.fields().iter().enumerate() {
        let Some(field) = record.field(index) else {
            continue;
        };
        if def.is_embedded() {
            if let Some(inner) = field.as_record() {
                collect_values(inner, values)?;
                continue;
            }
        }
        if def.column().is_some() {
            values.push(field.value()?);
        }
    }
    Ok(())
}

/// Declares a struct usable as a [`Record`].
///
/// Fields take `#[db = "column"]` and `#[req = "include"]` annotations; other
/// attributes go on the struct itself.
///
/// ```
/// use chrono::{DateTime, Utc};
/// use sqlx_requests::record;
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct Basic {
///         #[db = "id"]
///         pub id: String,
///         #[db = "createdAt"]
///         pub created_at: DateTime<Utc>,
///     }
/// }
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct User {
///         #[req = "include"]
///         pub basic: Basic,
///         #[db = "email"]
///         pub email: Option<String>,
///         #[db = "-"]
///         pub cached: bool,
///     }
/// }
///
/// let columns = sqlx_requests::record::columns("User", <User as sqlx_requests::Record>::schema())?;
/// assert_eq!(columns, ["id", "createdAt", "email"]);
/// # Ok::<(), sqlx_requests::Error>(())
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$tag:ident = $tag_value:literal])*
                $field_vis:vis $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $field_vis $field: $field_ty, )*
        }

        impl $crate::Record for $name {
            fn record_name(&self) -> &'static str {
                ::core::stringify!($name)
            }

            fn fields(&self) -> &'static [$crate::FieldDef] {
                <Self as $crate::Record>::schema()
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn $crate::Column> {
                [$( &self.$field as &dyn $crate::Column ),*].into_iter().nth(index)
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn $crate::Column> {
                [$( &mut self.$field as &mut dyn $crate::Column ),*].into_iter().nth(index)
            }

            fn schema() -> &'static [$crate::FieldDef] {
                const FIELDS: &[$crate::FieldDef] = &[
                    $(
                        $crate::FieldDef {
                            tags: &[ $( (::core::stringify!($tag), $tag_value) ),* ],
                            nested: <$field_ty as $crate::Column>::nested,
                        },
                    )*
                ];
                FIELDS
            }
        }

        impl $crate::Column for $name {
            fn type_name(&self) -> &'static str {
                ::core::stringify!($name)
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Other(::core::stringify!($name))
            }

            fn value(&self) -> $crate::Result<$crate::Value> {
                ::core::result::Result::Err($crate::Error::Unbindable(::core::stringify!($name)))
            }

            fn as_record(&self) -> ::core::option::Option<&dyn $crate::Record> {
                ::core::option::Option::Some(self)
            }

            fn nested() -> ::core::option::Option<&'static [$crate::FieldDef]> {
                ::core::option::Option::Some(<Self as $crate::Record>::schema())
            }
        }
    };
}

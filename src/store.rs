use crate::column::Slot;
use crate::error::Error;
use crate::value::Cell;

const BYTES_TARGETS: &str =
    "Vec<u8>, Option<Vec<u8>>, String, Option<String>, bool, or Option<bool>";
const INT64_TARGETS: &str = "i64 or Option<i64>";
const FLOAT64_TARGETS: &str = "f64 or Option<f64>";
const TIMESTAMP_TARGETS: &str = "DateTime<Utc> or Option<DateTime<Utc>>";
const NULL_TARGETS: &str = "any Option<_>";

/// Stores a driver cell into a destination slot.
///
/// `index` is the 1-based column position, only used in diagnostics.
///
/// # Errors
///
/// - [`Error::NotSettable`] when the slot is read-only
/// - [`Error::TypeMismatch`] when the cell can't be stored into the slot's type
pub fn store(slot: Slot<'_>, cell: Cell, index: usize) -> crate::Result<()> {
    if let Slot::ReadOnly(_) = slot {
        return Err(Error::NotSettable { index });
    }
    match cell {
        Cell::Bytes(bytes) => store_bytes(slot, bytes, index),
        Cell::Int64(value) => store_int(slot, value, index),
        Cell::Float64(value) => store_float(slot, value, index),
        Cell::Timestamp(value) => store_timestamp(slot, value, index),
        Cell::Null => store_null(slot, index),
    }
}

fn mismatch(slot: &Slot<'_>, cell: &'static str, expected: &'static str, index: usize) -> Error {
    Error::TypeMismatch {
        index,
        cell,
        expected,
        found: slot.type_name(),
    }
}

// Bytes are the only cell that converts: to text as-is, to bool on the first byte.
fn store_bytes(slot: Slot<'_>, bytes: Vec<u8>, index: usize) -> crate::Result<()> {
    match slot {
        Slot::Bytes(target) => *target = bytes,
        Slot::OptBytes(target) => *target = Some(bytes),
        Slot::Text(target) => *target = into_text(bytes),
        Slot::OptText(target) => *target = Some(into_text(bytes)),
        Slot::Bool(target) => *target = truthy(&bytes),
        Slot::OptBool(target) => *target = Some(truthy(&bytes)),
        other => return Err(mismatch(&other, "bytes", BYTES_TARGETS, index)),
    }
    Ok(())
}

fn store_int(slot: Slot<'_>, value: i64, index: usize) -> crate::Result<()> {
    match slot {
        Slot::Int64(target) => *target = value,
        Slot::OptInt64(target) => *target = Some(value),
        other => return Err(mismatch(&other, "int64", INT64_TARGETS, index)),
    }
    Ok(())
}

fn store_float(slot: Slot<'_>, value: f64, index: usize) -> crate::Result<()> {
    match slot {
        Slot::Float64(target) => *target = value,
        Slot::OptFloat64(target) => *target = Some(value),
        other => return Err(mismatch(&other, "float64", FLOAT64_TARGETS, index)),
    }
    Ok(())
}

fn store_timestamp(
    slot: Slot<'_>,
    value: chrono::DateTime<chrono::Utc>,
    index: usize,
) -> crate::Result<()> {
    match slot {
        Slot::Timestamp(target) => *target = value,
        Slot::OptTimestamp(target) => *target = Some(value),
        other => return Err(mismatch(&other, "timestamp", TIMESTAMP_TARGETS, index)),
    }
    Ok(())
}

fn store_null(slot: Slot<'_>, index: usize) -> crate::Result<()> {
    match slot {
        Slot::OptBytes(target) => *target = None,
        Slot::OptText(target) => *target = None,
        Slot::OptBool(target) => *target = None,
        Slot::OptInt64(target) => *target = None,
        Slot::OptFloat64(target) => *target = None,
        Slot::OptTimestamp(target) => *target = None,
        other => return Err(mismatch(&other, "null", NULL_TARGETS, index)),
    }
    Ok(())
}

fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn truthy(bytes: &[u8]) -> bool {
    bytes.first().is_some_and(|b| *b != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, ReadOnly};
    use crate::mock::Basic;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
    }

    fn bytes(s: &str) -> Cell {
        Cell::Bytes(s.as_bytes().to_vec())
    }

    fn type_mismatch(result: crate::Result<()>) -> (usize, &'static str, &'static str) {
        match result {
            Err(Error::TypeMismatch {
                index, cell, found, ..
            }) => (index, cell, found),
            other => panic!("expected a type mismatch, got {other:?}"),
        }
    }

    #[derive(Default)]
    struct Fields {
        raw: Vec<u8>,
        opt_raw: Option<Vec<u8>>,
        text: String,
        opt_text: Option<String>,
        flag: bool,
        opt_flag: Option<bool>,
        int: i64,
        opt_int: Option<i64>,
        float: f64,
        opt_float: Option<f64>,
        ts: DateTime<Utc>,
        opt_ts: Option<DateTime<Utc>>,
    }

    impl Fields {
        fn slots(&mut self) -> [Slot<'_>; 12] {
            [
                self.raw.slot(),
                self.opt_raw.slot(),
                self.text.slot(),
                self.opt_text.slot(),
                self.flag.slot(),
                self.opt_flag.slot(),
                self.int.slot(),
                self.opt_int.slot(),
                self.float.slot(),
                self.opt_float.slot(),
                self.ts.slot(),
                self.opt_ts.slot(),
            ]
        }
    }

    fn admissible(cell: &str, slot: &str) -> bool {
        match cell {
            "bytes" => [
                "Vec<u8>",
                "Option<Vec<u8>>",
                "String",
                "Option<String>",
                "bool",
                "Option<bool>",
            ]
            .contains(&slot),
            "int64" => slot == "i64" || slot == "Option<i64>",
            "float64" => slot == "f64" || slot == "Option<f64>",
            "timestamp" => slot == "DateTime<Utc>" || slot == "Option<DateTime<Utc>>",
            "null" => slot.starts_with("Option<"),
            _ => false,
        }
    }

    #[test]
    fn test_store_every_cell_into_every_slot() {
        let cells = [
            bytes("A"),
            Cell::Int64(1),
            Cell::Float64(1.0),
            Cell::Timestamp(t0()),
            Cell::Null,
        ];
        let mut stored = 0;
        for cell in cells {
            let mut fields = Fields::default();
            for slot in fields.slots() {
                let found = slot.type_name();
                let result = store(slot, cell.clone(), 1);
                if admissible(cell.kind(), found) {
                    assert!(result.is_ok(), "{} into {found}: {result:?}", cell.kind());
                    stored += 1;
                } else {
                    assert_eq!(type_mismatch(result), (1, cell.kind(), found));
                }
            }
        }
        assert_eq!(stored, 18);
    }

    #[test]
    fn test_store_bytes() {
        let mut raw: Vec<u8> = Vec::new();
        let mut opt_raw: Option<Vec<u8>> = None;
        let mut text = String::new();
        let mut opt_text: Option<String> = None;
        let mut flag = false;
        let mut opt_flag: Option<bool> = None;

        store(raw.slot(), bytes("A"), 1).unwrap();
        store(opt_raw.slot(), bytes("A"), 1).unwrap();
        store(text.slot(), bytes("A"), 1).unwrap();
        store(opt_text.slot(), bytes("A"), 1).unwrap();
        store(flag.slot(), Cell::Bytes(vec![1]), 1).unwrap();
        store(opt_flag.slot(), Cell::Bytes(vec![1]), 1).unwrap();

        assert_eq!(raw, b"A");
        assert_eq!(opt_raw.as_deref(), Some(&b"A"[..]));
        assert_eq!(text, "A");
        assert_eq!(opt_text.as_deref(), Some("A"));
        assert!(flag);
        assert_eq!(opt_flag, Some(true));
    }

    #[test]
    fn test_store_bytes_to_bool_uses_first_byte() {
        let mut flag = true;
        store(flag.slot(), Cell::Bytes(Vec::new()), 1).unwrap();
        assert!(!flag);

        store(flag.slot(), Cell::Bytes(vec![0, 1]), 1).unwrap();
        assert!(!flag);

        // ASCII "0" is a non-zero byte.
        store(flag.slot(), bytes("0"), 1).unwrap();
        assert!(flag);
    }

    #[test]
    fn test_store_bytes_invalid_utf8_is_replaced() {
        let mut text = String::new();
        store(text.slot(), Cell::Bytes(vec![b'a', 0xff]), 1).unwrap();
        assert_eq!(text, "a\u{fffd}");
    }

    #[test]
    fn test_store_int() {
        let mut value = 0i64;
        let mut opt: Option<i64> = None;
        store(value.slot(), Cell::Int64(42), 1).unwrap();
        store(opt.slot(), Cell::Int64(42), 1).unwrap();
        assert_eq!(value, 42);
        assert_eq!(opt, Some(42));
    }

    #[test]
    fn test_store_float() {
        let mut value = 0f64;
        let mut opt: Option<f64> = None;
        store(value.slot(), Cell::Float64(4.2), 1).unwrap();
        store(opt.slot(), Cell::Float64(4.2), 1).unwrap();
        assert_eq!(value, 4.2);
        assert_eq!(opt, Some(4.2));
    }

    #[test]
    fn test_store_timestamp() {
        let mut value = DateTime::<Utc>::default();
        let mut opt: Option<DateTime<Utc>> = None;
        store(value.slot(), Cell::Timestamp(t0()), 1).unwrap();
        store(opt.slot(), Cell::Timestamp(t0()), 1).unwrap();
        assert_eq!(value, t0());
        assert_eq!(opt, Some(t0()));
    }

    #[test]
    fn test_store_null() {
        let mut raw = Some(b"A".to_vec());
        let mut text = Some("A".to_owned());
        let mut flag = Some(true);
        let mut int = Some(1i64);
        let mut float = Some(1f64);
        let mut ts = Some(t0());

        store(raw.slot(), Cell::Null, 1).unwrap();
        store(text.slot(), Cell::Null, 1).unwrap();
        store(flag.slot(), Cell::Null, 1).unwrap();
        store(int.slot(), Cell::Null, 1).unwrap();
        store(float.slot(), Cell::Null, 1).unwrap();
        store(ts.slot(), Cell::Null, 1).unwrap();

        assert!(raw.is_none() && text.is_none() && flag.is_none());
        assert!(int.is_none() && float.is_none() && ts.is_none());
    }

    #[test]
    fn test_store_null_into_required_field() {
        let mut text = String::from("keep");
        let (index, cell, found) = type_mismatch(store(text.slot(), Cell::Null, 3));
        assert_eq!((index, cell, found), (3, "null", "String"));
        assert_eq!(text, "keep");
    }

    #[test]
    fn test_store_wrong_storing_type() {
        let mut text = String::new();
        let mut int = 0i64;
        let mut float = 0f64;
        let mut ts = DateTime::<Utc>::default();
        let mut opt_flag: Option<bool> = None;

        assert_eq!(
            type_mismatch(store(text.slot(), Cell::Int64(42), 1)),
            (1, "int64", "String")
        );
        assert_eq!(
            type_mismatch(store(int.slot(), bytes("A"), 2)),
            (2, "bytes", "i64")
        );
        assert_eq!(
            type_mismatch(store(float.slot(), Cell::Int64(1), 1)),
            (1, "int64", "f64")
        );
        assert_eq!(
            type_mismatch(store(ts.slot(), Cell::Float64(1.0), 1)),
            (1, "float64", "DateTime<Utc>")
        );
        assert_eq!(
            type_mismatch(store(opt_flag.slot(), Cell::Timestamp(t0()), 1)),
            (1, "timestamp", "Option<bool>")
        );
        assert_eq!(
            type_mismatch(store(int.slot(), Cell::Float64(1.0), 1)),
            (1, "float64", "i64")
        );
    }

    #[test]
    fn test_store_into_record_field() {
        let mut basic = Basic::default();
        assert_eq!(
            type_mismatch(store(basic.slot(), bytes("A"), 1)),
            (1, "bytes", "Basic")
        );
        assert_eq!(
            type_mismatch(store(basic.slot(), Cell::Null, 1)),
            (1, "null", "Basic")
        );
    }

    #[test]
    fn test_store_not_settable() {
        let mut id = ReadOnly(1i64);
        let err = store(id.slot(), Cell::Int64(2), 4).unwrap_err();
        assert!(matches!(err, Error::NotSettable { index: 4 }));
        assert_eq!(id.0, 1);
    }

    #[test]
    fn test_type_mismatch_message() {
        let mut text = String::new();
        let err = store(text.slot(), Cell::Int64(42), 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field #1 doesn't have the right type for int64 (expected: i64 or Option<i64>, got: String)"
        );
    }
}

//! Scan strategies, one per destination shape.
//!
//! Columns are matched to destinations by position: the i-th selected column
//! lands in the i-th declared field of a record, or in the i-th handle of a
//! positional list. Partial writes are kept when a row fails.

use std::mem;

use crate::column::{Column, ColumnList};
use crate::error::Error;
use crate::handler::{Row, Rows};
use crate::record::{Record, RecordList};
use crate::store::store;
use crate::value::Cell;

/// Scans a single row into the declared fields of a record.
pub fn scan_record(row: Box<dyn Row>, dest: &mut dyn Record) -> crate::Result<()> {
    let mut cells = vec![Cell::Null; dest.fields().len()];
    row.scan(&mut cells)?;
    store_record(dest, &mut cells)
}

/// Scans every row into a new record appended to `dest`, returning the row count.
pub async fn scan_records(rows: &mut dyn Rows, dest: &mut dyn RecordList) -> crate::Result<usize> {
    let mut cells = vec![Cell::Null; dest.element_fields().len()];
    let mut count = 0;
    while rows.next().await? {
        rows.scan(&mut cells)?;
        store_record(dest.push_default(), &mut cells)?;
        count += 1;
    }
    Ok(count)
}

/// Scans the single column of a single row.
pub fn scan_field(row: Box<dyn Row>, dest: &mut dyn Column) -> crate::Result<()> {
    let mut cells = [Cell::Null];
    row.scan(&mut cells)?;
    let [cell] = cells;
    store(dest.slot(), cell, 1)
}

/// Scans each column of a single row into the matching handle of `dest`.
pub fn scan_fields(row: Box<dyn Row>, dest: &mut [&mut dyn Column]) -> crate::Result<()> {
    let mut cells = vec![Cell::Null; dest.len()];
    row.scan(&mut cells)?;
    for (i, (field, cell)) in dest.iter_mut().zip(cells).enumerate() {
        store(field.slot(), cell, i + 1)?;
    }
    Ok(())
}

/// Scans the single column of every row into a new element appended to `dest`.
pub async fn scan_column(rows: &mut dyn Rows, dest: &mut dyn ColumnList) -> crate::Result<usize> {
    let mut cells = [Cell::Null];
    let mut count = 0;
    while rows.next().await? {
        rows.scan(&mut cells)?;
        store(dest.push_default().slot(), mem::take(&mut cells[0]), 1)?;
        count += 1;
    }
    Ok(count)
}

fn store_record(record: &mut dyn Record, cells: &mut [Cell]) -> crate::Result<()> {
    for (i, cell) in cells.iter_mut().enumerate() {
        let field = record
            .field_mut(i)
            .ok_or(Error::NotSettable { index: i + 1 })?;
        store(field.slot(), mem::take(cell), i + 1)?;
    }
    Ok(())
}

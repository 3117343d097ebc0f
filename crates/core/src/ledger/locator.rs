//! Row scanning over a fetched ledger block.

use log::trace;

use super::codec::{LedgerRecord, RowSkip};
use crate::cells::{cell_at, row_has_error_marker, CellValue, Row};

/// Decodes one row, rejecting formula errors in key or value columns first.
pub fn decode_row<R: LedgerRecord>(row: &[CellValue]) -> Result<R, RowSkip> {
    let layout = R::layout();
    if row.iter().all(CellValue::is_blank) {
        return Err(RowSkip::EmptyRow);
    }
    if row_has_error_marker(row, layout.key_columns)
        || row_has_error_marker(row, layout.value_columns)
    {
        return Err(RowSkip::ErrorMarker);
    }
    R::decode(row)
}

/// Block index of the first live row matching `key`.
pub fn find_by_key<R: LedgerRecord>(rows: &[Row], key: &R::Key) -> Option<usize> {
    let offset = R::layout().data_offset;
    rows.iter()
        .enumerate()
        .skip(offset)
        .find_map(|(index, row)| match decode_row::<R>(row) {
            Ok(record) if record.matches_key(key) => Some(index),
            _ => None,
        })
}

/// Block index of the last row that decodes as a live record.
pub fn find_last_valid_row<R: LedgerRecord>(rows: &[Row]) -> Option<usize> {
    let offset = R::layout().data_offset;
    (offset..rows.len())
        .rev()
        .find(|&index| decode_row::<R>(&rows[index]).is_ok())
}

/// Block index for a positional append: after the last live row, never
/// before the layout's minimum start row.
pub fn append_position<R: LedgerRecord>(rows: &[Row]) -> usize {
    let min_start = R::layout().min_start_row;
    match find_last_valid_row::<R>(rows) {
        Some(last) => (last + 1).max(min_start),
        None => min_start,
    }
}

/// First block index at or after `from_offset` whose `key_column` is blank.
/// Past the fetched window the slot is the first row after it, never one
/// before `from_offset`.
pub fn find_first_empty_slot(rows: &[Row], from_offset: usize, key_column: usize) -> usize {
    (from_offset..rows.len())
        .find(|&index| cell_at(&rows[index], key_column).is_blank())
        .unwrap_or_else(|| rows.len().max(from_offset))
}

/// Every live record with its block index.
pub fn decode_indexed<R: LedgerRecord>(rows: &[Row]) -> Vec<(usize, R)> {
    let offset = R::layout().data_offset;
    rows.iter()
        .enumerate()
        .skip(offset)
        .filter_map(|(index, row)| match decode_row::<R>(row) {
            Ok(record) => Some((index, record)),
            Err(reason) => {
                trace!("Skipping {} row {}: {:?}", R::layout().kind, index + 1, reason);
                None
            }
        })
        .collect()
}

pub fn decode_records<R: LedgerRecord>(rows: &[Row]) -> Vec<R> {
    decode_indexed::<R>(rows)
        .into_iter()
        .map(|(_, record)| record)
        .collect()
}

use log::{debug, warn};
use std::marker::PhantomData;
use std::sync::Arc;

use super::codec::{LedgerRecord, NATURAL_KEY_FIELD};
use super::layout::AppendMode;
use super::ledger_model::{DeleteOutcome, MutationOutcome, RecordSource};
use super::ledger_traits::LedgerStore;
use super::locator::{append_position, decode_indexed, find_by_key, find_first_empty_slot};
use crate::cells::{CellValue, Row};
use crate::errors::{Error, Result};
use crate::mirror::{MirrorFilter, MirrorSync};

/// Reads and writes one ledger sheet through its record codec.
///
/// Concurrent writers to the same key are not serialized: the duplicate
/// check and the write are separate requests, so two racing appends of the
/// same key can both land.
pub struct LedgerMutator<R: LedgerRecord> {
    store: Arc<dyn LedgerStore>,
    mirror: MirrorSync,
    _record: PhantomData<fn() -> R>,
}

impl<R: LedgerRecord> Clone for LedgerMutator<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            mirror: self.mirror.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: LedgerRecord> LedgerMutator<R> {
    pub fn new(store: Arc<dyn LedgerStore>, mirror: MirrorSync) -> Self {
        Self {
            store,
            mirror,
            _record: PhantomData,
        }
    }

    async fn read_block(&self) -> Result<Vec<Row>> {
        self.store.read_range(&R::layout().block_range()).await
    }

    /// Every live record in the ledger.
    pub async fn list(&self) -> Result<Vec<R>> {
        let rows = self.read_block().await?;
        Ok(decode_indexed::<R>(&rows)
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Lists from the ledger, or from the mirror when the ledger is
    /// unreachable. The ledger error is returned when the mirror has nothing.
    pub async fn list_with_fallback(&self) -> Result<Vec<R>> {
        match self.list().await {
            Ok(records) => Ok(records),
            Err(ledger_err) => {
                warn!(
                    "Reading {} ledger failed, trying mirror: {}",
                    R::layout().kind,
                    ledger_err
                );
                let rows = match self
                    .mirror
                    .select(R::layout().mirror_table, &MirrorFilter::all())
                    .await
                {
                    Ok(rows) => rows,
                    Err(e) => {
                        warn!("Mirror read failed: {}", e);
                        return Err(ledger_err);
                    }
                };
                let records: Vec<R> = rows.iter().filter_map(R::from_mirror_row).collect();
                if records.is_empty() {
                    Err(ledger_err)
                } else {
                    Ok(records)
                }
            }
        }
    }

    /// The live record for `key` with its one-based sheet row.
    pub async fn find(&self, key: &R::Key) -> Result<Option<(usize, R)>> {
        let rows = self.read_block().await?;
        Ok(find_by_key::<R>(&rows, key).and_then(|index| {
            R::decode(&rows[index])
                .ok()
                .map(|record| (index + 1, record))
        }))
    }

    pub async fn append(&self, record: R) -> Result<MutationOutcome<R>> {
        record.validate()?;
        let rows = self.read_block().await?;
        let layout = R::layout();

        if layout.unique_keys && find_by_key::<R>(&rows, &record.key()).is_some() {
            return Err(Error::DuplicateKey(R::mirror_key(&record.key())));
        }

        let row = self.write_new(&rows, &record).await?;
        self.mirror_upsert(&record).await;
        Ok(MutationOutcome {
            row,
            record: with_ledger_source(record),
        })
    }

    /// Replaces the record at `old_key`. A changed key on a relocating layout
    /// clears the old row and appends the new record.
    pub async fn update(&self, old_key: &R::Key, record: R) -> Result<MutationOutcome<R>> {
        record.validate()?;
        let mut rows = self.read_block().await?;
        let layout = R::layout();

        let old_index = find_by_key::<R>(&rows, old_key)
            .ok_or_else(|| Error::NotFound(R::mirror_key(old_key)))?;

        let new_key = record.key();
        let key_changed = !record.matches_key(old_key);
        if key_changed && layout.unique_keys {
            if let Some(existing) = find_by_key::<R>(&rows, &new_key) {
                if existing != old_index {
                    return Err(Error::DuplicateKey(R::mirror_key(&new_key)));
                }
            }
        }

        let row = if key_changed && layout.relocate_on_key_change {
            self.clear_values(old_index).await?;
            for &col in layout.value_columns {
                if let Some(cell) = rows[old_index].get_mut(col) {
                    *cell = CellValue::cleared();
                }
            }
            self.write_new(&rows, &record).await?
        } else {
            self.write_owned(old_index, &record.encode()).await?;
            Some(old_index + 1)
        };

        if key_changed {
            self.mirror_delete(old_key).await;
        }
        self.mirror_upsert(&record).await;

        debug!(
            "Updated {} {} -> {}",
            layout.kind,
            R::mirror_key(old_key),
            R::mirror_key(&new_key)
        );
        Ok(MutationOutcome {
            row,
            record: with_ledger_source(record),
        })
    }

    /// Clears the value columns of the row for `key`. When the ledger has no
    /// such row, succeeds only if the mirror still held it.
    pub async fn soft_delete(&self, key: &R::Key) -> Result<DeleteOutcome> {
        let rows = self.read_block().await?;
        let layout = R::layout();

        match find_by_key::<R>(&rows, key) {
            Some(index) => {
                self.clear_values(index).await?;
                self.mirror_delete(key).await;
                Ok(DeleteOutcome::Deleted { row: index + 1 })
            }
            None => {
                let filter = MirrorFilter::eq(NATURAL_KEY_FIELD, R::mirror_key(key));
                let removed = self.mirror.delete_now(layout.mirror_table, &filter).await;
                if removed > 0 {
                    debug!(
                        "{} {} existed only in the mirror",
                        layout.kind,
                        R::mirror_key(key)
                    );
                    Ok(DeleteOutcome::MirrorOnly)
                } else {
                    Err(Error::NotFound(R::mirror_key(key)))
                }
            }
        }
    }

    /// Writes `record` at the layout's append position. Returns the sheet row.
    async fn write_new(&self, rows: &[Row], record: &R) -> Result<Option<usize>> {
        let layout = R::layout();
        let encoded = record.encode();
        match layout.append_mode {
            AppendMode::AfterLastValid => {
                let index = append_position::<R>(rows);
                self.write_owned(index, &encoded).await?;
                Ok(Some(index + 1))
            }
            AppendMode::FirstEmptySlot => {
                let index = find_first_empty_slot(
                    rows,
                    layout.data_offset.max(layout.min_start_row),
                    layout.primary_key_column(),
                );
                self.write_owned(index, &encoded).await?;
                Ok(Some(index + 1))
            }
            AppendMode::Append => {
                let last_owned = layout.owned_columns.iter().copied().max().unwrap_or(0);
                let cells: Row = encoded
                    .into_iter()
                    .enumerate()
                    .take(last_owned + 1)
                    .map(|(col, cell)| {
                        if layout.owned_columns.contains(&col) {
                            cell
                        } else {
                            CellValue::Empty
                        }
                    })
                    .collect();
                self.store
                    .append_rows(&layout.block_range(), vec![cells])
                    .await
            }
        }
    }

    /// Writes only the owned columns of `encoded`, one request per
    /// contiguous run.
    async fn write_owned(&self, index: usize, encoded: &[CellValue]) -> Result<()> {
        let layout = R::layout();
        for (start, end) in layout.owned_runs() {
            let cells: Row = (start..=end)
                .map(|col| encoded.get(col).cloned().unwrap_or_else(CellValue::cleared))
                .collect();
            self.store
                .write_range(&layout.row_range(index, start, end), vec![cells])
                .await?;
        }
        Ok(())
    }

    async fn clear_values(&self, index: usize) -> Result<()> {
        let layout = R::layout();
        for (start, end) in layout.value_runs() {
            let cells: Row = (start..=end).map(|_| CellValue::cleared()).collect();
            self.store
                .write_range(&layout.row_range(index, start, end), vec![cells])
                .await?;
        }
        Ok(())
    }

    async fn mirror_upsert(&self, record: &R) {
        match record.to_mirror_row() {
            Ok(row) => self.mirror.upsert(R::layout().mirror_table, row).await,
            Err(e) => warn!("Could not build mirror row: {}", e),
        }
    }

    async fn mirror_delete(&self, key: &R::Key) {
        let filter = MirrorFilter::eq(NATURAL_KEY_FIELD, R::mirror_key(key));
        self.mirror.delete(R::layout().mirror_table, filter).await;
    }
}

fn with_ledger_source<R: LedgerRecord>(mut record: R) -> R {
    record.set_source(RecordSource::Ledger);
    record
}

use async_trait::async_trait;
use log::{debug, warn};

use sheetfolio_core::cells::Row;
use sheetfolio_core::errors::Result;
use sheetfolio_core::ledger::{LedgerStore, RangeSpec};

use crate::client::SheetsApiClient;
use crate::models::ValueRange;

/// `LedgerStore` backed by the values API of one spreadsheet.
pub struct SheetsLedgerStore {
    client: SheetsApiClient,
}

impl SheetsLedgerStore {
    pub fn new(client: SheetsApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LedgerStore for SheetsLedgerStore {
    async fn read_range(&self, range: &RangeSpec) -> Result<Vec<Row>> {
        let a1 = range.to_a1();
        let values = self.client.get_values(&a1).await?;
        debug!("Read {} row(s) from {}", values.values.len(), a1);
        Ok(values.values)
    }

    async fn append_rows(&self, range: &RangeSpec, rows: Vec<Row>) -> Result<Option<usize>> {
        let a1 = range.to_a1();
        let body = ValueRange::rows(&a1, rows);
        let response = self.client.append_values(&a1, &body).await?;

        let updated = response.updates.and_then(|u| u.updated_range);
        let row = updated.as_deref().and_then(parse_updated_row);
        if row.is_none() {
            warn!("Append to {} did not report the written row", a1);
        }
        Ok(row)
    }

    async fn write_range(&self, range: &RangeSpec, rows: Vec<Row>) -> Result<()> {
        let a1 = range.to_a1();
        let body = ValueRange::rows(&a1, rows);
        let response = self.client.update_values(&a1, &body).await?;
        debug!(
            "Updated {} cell(s) in {}",
            response.updated_cells.unwrap_or(0),
            response.updated_range.as_deref().unwrap_or(&a1)
        );
        Ok(())
    }
}

/// First sheet row of an A1 range such as `'Sheet 1'!A5:D5`.
pub fn parse_updated_row(range: &str) -> Option<usize> {
    let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
    let start = cells.split(':').next()?;
    let digits: String = start
        .chars()
        .skip_while(|c| c.is_ascii_alphabetic())
        .collect();
    digits.parse().ok().filter(|row| *row > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_updated_row() {
        assert_eq!(parse_updated_row("Deposits!A5:D5"), Some(5));
        assert_eq!(parse_updated_row("'My Sheet'!AB120:AC120"), Some(120));
        assert_eq!(parse_updated_row("'a!b'!C7"), Some(7));
        assert_eq!(parse_updated_row("B12:C12"), Some(12));
    }

    #[test]
    fn test_parse_updated_row_without_row_number() {
        assert_eq!(parse_updated_row("Deposits!A:D"), None);
        assert_eq!(parse_updated_row(""), None);
        assert_eq!(parse_updated_row("Deposits!A0:D0"), None);
    }
}

//! Bulk monthly rate dataset.

use csv::{ReaderBuilder, Trim};
use log::{debug, trace};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::cells::{parse_optional_amount, CellValue};
use crate::period::YearMonth;

/// Parses a published `period,rate` table into monthly rates.
///
/// The first column is a period label in any accepted encoding (a full date
/// counts for its month); the rate is the first positive number after it.
/// Header rows, garbage rows and non-positive rates are skipped. When a
/// month appears more than once the later row wins.
pub fn parse_rate_document(document: &str) -> BTreeMap<YearMonth, Decimal> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(document.as_bytes());

    let mut rates = BTreeMap::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                trace!("Skipping dataset line {}: {}", line + 1, e);
                continue;
            }
        };

        let Some(period) = record.get(0).and_then(YearMonth::parse) else {
            trace!("Skipping dataset line {}: no period", line + 1);
            continue;
        };

        let rate = record
            .iter()
            .skip(1)
            .filter_map(|field| parse_optional_amount(&CellValue::text(field)))
            .find(|v| *v > Decimal::ZERO);

        match rate {
            Some(rate) => {
                rates.insert(period, rate);
            }
            None => trace!("Skipping dataset line {}: no positive rate", line + 1),
        }
    }

    debug!("Parsed {} monthly rates from dataset", rates.len());
    rates
}

/// Carries `current_rate` into every month after the last known month up to
/// `present`. Existing months are never overwritten; an empty dataset gets
/// only `present`. Returns the months added.
pub fn backfill_months(
    rates: &mut BTreeMap<YearMonth, Decimal>,
    present: YearMonth,
    current_rate: Decimal,
) -> Vec<YearMonth> {
    let start = match rates.keys().next_back() {
        Some(last) => last.next(),
        None => present,
    };

    let mut added = Vec::new();
    for month in start.range_inclusive(&present) {
        if let std::collections::btree_map::Entry::Vacant(entry) = rates.entry(month) {
            entry.insert(current_rate);
            added.push(month);
        }
    }
    added
}

use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::index_layout::IndexBlockLayout;
use crate::cells::{cell_at, parse_optional_amount, CellValue, Row};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, INDEX_DECIMAL_PRECISION};
use crate::errors::Result;
use crate::fx::FxRateServiceTrait;
use crate::ledger::{LedgerStore, RangeSpec};
use crate::period::YearMonth;
use crate::series::{
    SeriesPoint, ADJUSTED_INDEX_FIELD, DOLLAR_INDEX_FIELD, RAW_INDEX_FIELD, RAW_RETURN_PCT_FIELD,
    RETURN_PCT_FIELD,
};

/// Positive rate of the earliest data row that has one, else the earliest
/// positive rate in the lookup.
pub fn base_rate(
    rows: &[Row],
    layout: &IndexBlockLayout,
    rates: &BTreeMap<YearMonth, Decimal>,
) -> Option<Decimal> {
    rows.iter()
        .skip(layout.data_offset)
        .filter_map(|row| layout.period_of(row))
        .filter_map(|period| rates.get(&period).map(|rate| (period, *rate)))
        .filter(|(_, rate)| *rate > Decimal::ZERO)
        .min_by_key(|(period, _)| *period)
        .map(|(_, rate)| rate)
        .or_else(|| rates.values().copied().find(|rate| *rate > Decimal::ZERO))
}

/// Dollar and adjusted index of one row, both rounded for the sheet.
fn derive(raw: Decimal, rate: Decimal, base: Decimal) -> (Decimal, Decimal) {
    let dollar = rate / base * Decimal::ONE_HUNDRED;
    let adjusted = raw * dollar / Decimal::ONE_HUNDRED;
    (
        dollar.round_dp(INDEX_DECIMAL_PRECISION),
        adjusted.round_dp(INDEX_DECIMAL_PRECISION),
    )
}

/// Fills the dollar and adjusted index columns of every data row that has a
/// period rate and a raw index. Other rows and the raw columns are returned
/// as they were. An empty lookup changes nothing.
pub fn enrich_index_rows(
    rows: &[Row],
    layout: &IndexBlockLayout,
    rates: &BTreeMap<YearMonth, Decimal>,
) -> Vec<Row> {
    let Some(base) = base_rate(rows, layout, rates) else {
        return rows.to_vec();
    };

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            if index < layout.data_offset {
                return row.clone();
            }
            let Some(rate) = layout.period_of(row).and_then(|p| rates.get(&p)) else {
                return row.clone();
            };
            let Some(raw) = parse_optional_amount(cell_at(row, layout.raw_index_column)) else {
                return row.clone();
            };

            let (dollar, adjusted) = derive(raw, *rate, base);
            let mut enriched = row.clone();
            if enriched.len() <= layout.last_column() {
                enriched.resize(layout.last_column() + 1, CellValue::Empty);
            }
            enriched[layout.dollar_index_column] = CellValue::decimal(dollar);
            enriched[layout.adjusted_index_column] = CellValue::decimal(adjusted);
            enriched
        })
        .collect()
}

fn percent_change(value: Decimal, first: Decimal) -> Option<Decimal> {
    if first.is_zero() {
        return None;
    }
    Some(((value / first - Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION))
}

/// Index points ordered by period, with returns relative to the first point.
///
/// `returnPct` follows the adjusted index and `rawReturnPct` the raw index.
/// Months without a rate carry only the raw values.
pub fn index_series(
    rows: &[Row],
    layout: &IndexBlockLayout,
    rates: &BTreeMap<YearMonth, Decimal>,
) -> Vec<SeriesPoint> {
    let base = base_rate(rows, layout, rates);

    let mut by_period: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for row in rows.iter().skip(layout.data_offset) {
        let (Some(period), Some(raw)) = (
            layout.period_of(row),
            parse_optional_amount(cell_at(row, layout.raw_index_column)),
        ) else {
            continue;
        };
        by_period.insert(period, raw);
    }

    let derived: Vec<(YearMonth, Decimal, Option<(Decimal, Decimal)>)> = by_period
        .into_iter()
        .map(|(period, raw)| {
            let outputs = match (rates.get(&period), base) {
                (Some(rate), Some(base)) => Some(derive(raw, *rate, base)),
                _ => None,
            };
            (period, raw, outputs)
        })
        .collect();

    let first_raw = derived.first().map(|(_, raw, _)| *raw);
    let first_adjusted = derived
        .iter()
        .find_map(|(_, _, outputs)| outputs.map(|(_, adjusted)| adjusted));

    derived
        .into_iter()
        .map(|(period, raw, outputs)| {
            let raw_return = first_raw.and_then(|first| percent_change(raw, first));
            let point = SeriesPoint::new(period.label())
                .with(RAW_INDEX_FIELD, Some(raw))
                .with(RAW_RETURN_PCT_FIELD, raw_return);
            match outputs {
                Some((dollar, adjusted)) => point
                    .with(DOLLAR_INDEX_FIELD, Some(dollar))
                    .with(ADJUSTED_INDEX_FIELD, Some(adjusted))
                    .with(
                        RETURN_PCT_FIELD,
                        first_adjusted.and_then(|first| percent_change(adjusted, first)),
                    ),
                None => point
                    .with(DOLLAR_INDEX_FIELD, None)
                    .with(ADJUSTED_INDEX_FIELD, None)
                    .with(RETURN_PCT_FIELD, None),
            }
        })
        .collect()
}

/// Reads an index block, derives its currency-adjusted columns from the
/// monthly rate history and optionally writes them back.
pub struct RateEnricher {
    store: Arc<dyn LedgerStore>,
    fx: Arc<dyn FxRateServiceTrait>,
    layout: IndexBlockLayout,
}

impl RateEnricher {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        fx: Arc<dyn FxRateServiceTrait>,
        layout: IndexBlockLayout,
    ) -> Self {
        Self { store, fx, layout }
    }

    pub fn layout(&self) -> &IndexBlockLayout {
        &self.layout
    }

    async fn load(&self) -> Result<(Vec<Row>, BTreeMap<YearMonth, Decimal>)> {
        let rows = self.store.read_range(&self.layout.block_range()).await?;
        let rates = self.fx.get_historical_rates().await;
        Ok((rows, rates))
    }

    /// Block rows with the derived columns filled in. Nothing is written.
    pub async fn enriched_rows(&self) -> Result<Vec<Row>> {
        let (rows, rates) = self.load().await?;
        Ok(enrich_index_rows(&rows, &self.layout, &rates))
    }

    pub async fn index_series(&self) -> Result<Vec<SeriesPoint>> {
        let (rows, rates) = self.load().await?;
        Ok(index_series(&rows, &self.layout, &rates))
    }

    /// Writes the derived columns of rows whose outputs changed and returns
    /// how many rows that was. Unchanged rows inside the written block are
    /// sent as empty cells, which the ledger leaves alone.
    pub async fn enrich_sheet(&self) -> Result<usize> {
        let (rows, rates) = self.load().await?;
        let enriched = enrich_index_rows(&rows, &self.layout, &rates);
        let (start_col, end_col) = self.layout.output_span();

        let outputs = |row: &Row| -> Vec<Option<Decimal>> {
            (start_col..=end_col)
                .map(|col| parse_optional_amount(cell_at(row, col)))
                .collect()
        };

        let changed: Vec<usize> = enriched
            .iter()
            .enumerate()
            .filter(|(index, row)| {
                let before = rows.get(*index).map(&outputs).unwrap_or_default();
                outputs(row) != before
            })
            .map(|(index, _)| index)
            .collect();

        let (Some(&first), Some(&last)) = (changed.first(), changed.last()) else {
            debug!("{} is already up to date", self.layout.sheet);
            return Ok(0);
        };

        let block: Vec<Row> = (first..=last)
            .map(|index| {
                if changed.contains(&index) {
                    (start_col..=end_col)
                        .map(|col| cell_at(&enriched[index], col).clone())
                        .collect()
                } else {
                    vec![CellValue::Empty; end_col - start_col + 1]
                }
            })
            .collect();

        let range = RangeSpec::block(self.layout.sheet, start_col, end_col, first + 1, last + 1);
        self.store.write_range(&range, block).await?;
        info!(
            "Enriched {} row(s) of {} in {}",
            changed.len(),
            self.layout.sheet,
            range
        );
        Ok(changed.len())
    }
}

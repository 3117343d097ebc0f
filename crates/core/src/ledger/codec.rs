//! Row codecs: the only code that reads or writes raw ledger cells.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::layout::{LedgerLayout, BALANCE_LAYOUT, DEPOSIT_LAYOUT, DIVIDEND_LAYOUT, HOLDING_LAYOUT};
use super::ledger_model::{
    AccountBalanceRecord, DepositKey, DepositRecord, DepositType, DividendKey, DividendRecord,
    HoldingRecord, RecordSource,
};
use crate::cells::{
    cell_at, format_iso_date, parse_date, parse_month_token, parse_optional_amount,
    parse_year_token, CellValue, Row,
};
use crate::constants::{FOREIGN_AMOUNT_EPSILON, LOCAL_AMOUNT_EPSILON, LOCAL_CURRENCY};
use crate::errors::{Error, Result, ValidationError};
use crate::period::YearMonth;

/// Field holding the natural key in mirror rows.
pub const NATURAL_KEY_FIELD: &str = "naturalKey";

/// Why a row did not decode into a record. Skipped rows never abort a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSkip {
    EmptyRow,
    ErrorMarker,
    BlankKey,
    InvalidKey,
    /// Value columns are blank or zero: a soft-deleted or unfilled row.
    BlankValue,
    NegativeValue,
}

/// A record stored one per row in a ledger sheet.
pub trait LedgerRecord:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Key: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn layout() -> &'static LedgerLayout;

    fn key(&self) -> Self::Key;

    fn matches_key(&self, key: &Self::Key) -> bool;

    fn decode(row: &[CellValue]) -> std::result::Result<Self, RowSkip>;

    /// Full-width row. Formula columns are `Empty`.
    fn encode(&self) -> Row;

    fn validate(&self) -> Result<()>;

    fn set_source(&mut self, source: RecordSource);

    fn mirror_key(key: &Self::Key) -> String {
        key.to_string()
    }

    fn to_mirror_row(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert(
                NATURAL_KEY_FIELD.to_string(),
                Value::String(Self::mirror_key(&self.key())),
            );
        }
        Ok(value)
    }

    fn from_mirror_row(value: &Value) -> Option<Self> {
        let mut record: Self = serde_json::from_value(value.clone()).ok()?;
        record.set_source(RecordSource::Mirror);
        Some(record)
    }
}

fn blank_or_invalid(cells: &[&CellValue]) -> RowSkip {
    if cells.iter().all(|c| c.is_blank()) {
        RowSkip::BlankKey
    } else {
        RowSkip::InvalidKey
    }
}

fn positive_amount(cell: &CellValue) -> std::result::Result<Decimal, RowSkip> {
    match parse_optional_amount(cell) {
        None => Err(RowSkip::BlankValue),
        Some(v) if v.is_zero() => Err(RowSkip::BlankValue),
        Some(v) if v.is_sign_negative() => Err(RowSkip::NegativeValue),
        Some(v) => Ok(v),
    }
}

fn optional_memo(cell: &CellValue) -> Option<String> {
    let text = cell.as_text();
    if text.is_empty() {
        None
    } else {
        Some(text.into_owned())
    }
}

fn within(a: Decimal, b: Decimal, epsilon: Decimal) -> bool {
    (a - b).abs() < epsilon
}

fn non_negative(value: Decimal, field: &str) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::Validation(ValidationError::NegativeAmount(
            field.to_string(),
        )));
    }
    Ok(())
}

fn required_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            field.to_string(),
        )));
    }
    Ok(())
}

// ==================== Account balances ====================

impl LedgerRecord for AccountBalanceRecord {
    type Key = YearMonth;

    fn layout() -> &'static LedgerLayout {
        &BALANCE_LAYOUT
    }

    fn key(&self) -> YearMonth {
        self.year_month
    }

    fn matches_key(&self, key: &YearMonth) -> bool {
        self.year_month == *key
    }

    /// Year comes from the year column, then the two-digit column, then the
    /// compact `YYYYMM` column. Month prefers the numeric column over the
    /// `"N월"` label.
    fn decode(row: &[CellValue]) -> std::result::Result<Self, RowSkip> {
        let compact = YearMonth::parse(&cell_at(row, 2).as_text());

        let mut year = parse_year_token(cell_at(row, 3));
        if year == 0 {
            year = parse_year_token(cell_at(row, 0));
        }
        if year == 0 {
            year = compact.map(|ym| ym.year).unwrap_or(0);
        }

        let mut month = parse_month_token(cell_at(row, 1), cell_at(row, 4));
        if month == 0 {
            month = compact.map(|ym| ym.month).unwrap_or(0);
        }

        let year_month = YearMonth::new(year, month).ok_or_else(|| {
            blank_or_invalid(&[
                cell_at(row, 0),
                cell_at(row, 1),
                cell_at(row, 2),
                cell_at(row, 3),
                cell_at(row, 4),
            ])
        })?;

        let balance = positive_amount(cell_at(row, 6))?;

        Ok(Self::new(year_month, balance))
    }

    fn encode(&self) -> Row {
        let ym = self.year_month;
        vec![
            CellValue::text(format!("{:02}", ym.year.rem_euclid(100))),
            CellValue::text(ym.month.to_string()),
            CellValue::text(ym.compact()),
            CellValue::text(ym.year.to_string()),
            CellValue::text(format!("{}월", ym.month)),
            CellValue::Empty,
            CellValue::decimal(self.balance),
        ]
    }

    fn validate(&self) -> Result<()> {
        non_negative(self.balance, "balance")?;
        if self.balance.is_zero() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "balance must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }

    fn set_source(&mut self, source: RecordSource) {
        self.source = source;
    }
}

// ==================== Dividends ====================

impl DividendRecord {
    pub fn key_of(&self) -> DividendKey {
        DividendKey {
            date: self.date,
            symbol: self.symbol.trim().to_uppercase(),
            amount_local: self.amount_local,
            amount_foreign: self.amount_foreign,
        }
    }
}

impl LedgerRecord for DividendRecord {
    type Key = DividendKey;

    fn layout() -> &'static LedgerLayout {
        &DIVIDEND_LAYOUT
    }

    fn key(&self) -> DividendKey {
        self.key_of()
    }

    fn matches_key(&self, key: &DividendKey) -> bool {
        self.date == key.date
            && self.symbol.trim().eq_ignore_ascii_case(key.symbol.trim())
            && within(self.amount_local, key.amount_local, LOCAL_AMOUNT_EPSILON)
            && within(self.amount_foreign, key.amount_foreign, FOREIGN_AMOUNT_EPSILON)
    }

    fn decode(row: &[CellValue]) -> std::result::Result<Self, RowSkip> {
        let date = parse_date(cell_at(row, 0))
            .ok_or_else(|| blank_or_invalid(&[cell_at(row, 0), cell_at(row, 1)]))?;

        let symbol = cell_at(row, 1).as_text().into_owned();
        if symbol.is_empty() {
            return Err(RowSkip::BlankKey);
        }

        let local = parse_optional_amount(cell_at(row, 3));
        let foreign = parse_optional_amount(cell_at(row, 4));
        let amount_local = local.unwrap_or(Decimal::ZERO);
        let amount_foreign = foreign.unwrap_or(Decimal::ZERO);

        if amount_local.is_sign_negative() && !amount_local.is_zero()
            || amount_foreign.is_sign_negative() && !amount_foreign.is_zero()
        {
            return Err(RowSkip::NegativeValue);
        }
        if amount_local.is_zero() && amount_foreign.is_zero() {
            return Err(RowSkip::BlankValue);
        }

        Ok(Self {
            date,
            symbol,
            name: cell_at(row, 2).as_text().into_owned(),
            amount_local,
            amount_foreign,
            memo: optional_memo(cell_at(row, 7)),
            source: RecordSource::Ledger,
        })
    }

    fn encode(&self) -> Row {
        vec![
            CellValue::text(format_iso_date(self.date)),
            CellValue::text(self.symbol.trim().to_uppercase()),
            CellValue::optional_text(Some(&self.name)),
            CellValue::decimal(self.amount_local),
            CellValue::decimal(self.amount_foreign),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::optional_text(self.memo.as_deref()),
        ]
    }

    fn validate(&self) -> Result<()> {
        required_text(&self.symbol, "symbol")?;
        non_negative(self.amount_local, "amountLocal")?;
        non_negative(self.amount_foreign, "amountForeign")?;
        if self.amount_local.is_zero() && self.amount_foreign.is_zero() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "a dividend needs a local or a foreign amount".to_string(),
            )));
        }
        Ok(())
    }

    fn set_source(&mut self, source: RecordSource) {
        self.source = source;
    }
}

// ==================== Deposits ====================

impl LedgerRecord for DepositRecord {
    type Key = DepositKey;

    fn layout() -> &'static LedgerLayout {
        &DEPOSIT_LAYOUT
    }

    fn key(&self) -> DepositKey {
        DepositKey {
            date: self.date,
            deposit_type: self.deposit_type,
            amount: self.amount,
        }
    }

    fn matches_key(&self, key: &DepositKey) -> bool {
        self.date == key.date
            && self.deposit_type == key.deposit_type
            && within(self.amount, key.amount, LOCAL_AMOUNT_EPSILON)
    }

    /// A negative amount with no type label is a withdrawal.
    fn decode(row: &[CellValue]) -> std::result::Result<Self, RowSkip> {
        let date = parse_date(cell_at(row, 0))
            .ok_or_else(|| blank_or_invalid(&[cell_at(row, 0)]))?;

        let raw_amount = match parse_optional_amount(cell_at(row, 2)) {
            None => return Err(RowSkip::BlankValue),
            Some(v) if v.is_zero() => return Err(RowSkip::BlankValue),
            Some(v) => v,
        };

        let type_cell = cell_at(row, 1);
        let deposit_type = if type_cell.is_blank() {
            if raw_amount.is_sign_negative() {
                DepositType::Withdrawal
            } else {
                DepositType::Deposit
            }
        } else {
            DepositType::from_label(&type_cell.as_text()).ok_or(RowSkip::InvalidKey)?
        };

        Ok(Self {
            date,
            deposit_type,
            amount: raw_amount.abs(),
            memo: optional_memo(cell_at(row, 3)),
            source: RecordSource::Ledger,
        })
    }

    fn encode(&self) -> Row {
        vec![
            CellValue::text(format_iso_date(self.date)),
            CellValue::text(self.deposit_type.label()),
            CellValue::decimal(self.amount),
            CellValue::optional_text(self.memo.as_deref()),
            CellValue::Empty,
        ]
    }

    fn validate(&self) -> Result<()> {
        non_negative(self.amount, "amount")?;
        if self.amount.is_zero() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "amount must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }

    fn set_source(&mut self, source: RecordSource) {
        self.source = source;
    }
}

// ==================== Holdings ====================

impl LedgerRecord for HoldingRecord {
    type Key = String;

    fn layout() -> &'static LedgerLayout {
        &HOLDING_LAYOUT
    }

    fn key(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    fn matches_key(&self, key: &String) -> bool {
        self.symbol.trim().eq_ignore_ascii_case(key.trim())
    }

    fn decode(row: &[CellValue]) -> std::result::Result<Self, RowSkip> {
        let symbol = cell_at(row, 0).as_text().into_owned();
        if symbol.is_empty() {
            return Err(RowSkip::BlankKey);
        }

        let quantity = match parse_optional_amount(cell_at(row, 2)) {
            None => return Err(RowSkip::BlankValue),
            Some(v) if v.is_sign_negative() && !v.is_zero() => {
                return Err(RowSkip::NegativeValue)
            }
            Some(v) => v,
        };
        let average_price = parse_optional_amount(cell_at(row, 3)).unwrap_or(Decimal::ZERO);

        let currency = cell_at(row, 4).as_text().to_uppercase();

        Ok(Self {
            symbol,
            name: cell_at(row, 1).as_text().into_owned(),
            quantity,
            average_price,
            currency: if currency.is_empty() {
                LOCAL_CURRENCY.to_string()
            } else {
                currency
            },
            source: RecordSource::Ledger,
        })
    }

    fn encode(&self) -> Row {
        let mut row = vec![
            CellValue::text(self.symbol.trim().to_uppercase()),
            CellValue::optional_text(Some(&self.name)),
            CellValue::decimal(self.quantity),
            CellValue::decimal(self.average_price),
            CellValue::text(self.currency.trim().to_uppercase()),
        ];
        row.resize(HOLDING_LAYOUT.width, CellValue::Empty);
        row
    }

    fn validate(&self) -> Result<()> {
        required_text(&self.symbol, "symbol")?;
        required_text(&self.currency, "currency")?;
        non_negative(self.quantity, "quantity")?;
        non_negative(self.average_price, "averagePrice")?;
        Ok(())
    }

    fn set_source(&mut self, source: RecordSource) {
        self.source = source;
    }
}

/// Sheet date for a record key, for callers building keys from text input.
pub fn parse_key_date(input: &str) -> Result<NaiveDate> {
    parse_date(&CellValue::text(input)).ok_or_else(|| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "'{}' is not a date",
            input
        )))
    })
}

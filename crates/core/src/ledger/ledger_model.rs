use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::period::YearMonth;

/// Where a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordSource {
    #[default]
    Ledger,
    Mirror,
}

/// Month-end balance of the brokerage account, in local currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceRecord {
    pub year_month: YearMonth,
    pub balance: Decimal,
    #[serde(default)]
    pub source: RecordSource,
}

impl AccountBalanceRecord {
    pub fn new(year_month: YearMonth, balance: Decimal) -> Self {
        Self {
            year_month,
            balance,
            source: RecordSource::Ledger,
        }
    }
}

/// A dividend receipt. Either amount may be zero, not both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendRecord {
    pub date: NaiveDate,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub amount_local: Decimal,
    pub amount_foreign: Decimal,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub source: RecordSource,
}

/// Natural key of a dividend. Amounts compare within a tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendKey {
    pub date: NaiveDate,
    pub symbol: String,
    pub amount_local: Decimal,
    pub amount_foreign: Decimal,
}

impl fmt::Display for DividendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.date.format("%Y-%m-%d"),
            self.symbol.to_uppercase(),
            self.amount_local.normalize(),
            self.amount_foreign.normalize()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositType {
    Deposit,
    Withdrawal,
}

impl DepositType {
    /// Label written to the sheet.
    pub fn label(&self) -> &'static str {
        match self {
            DepositType::Deposit => "입금",
            DepositType::Withdrawal => "출금",
        }
    }

    /// Accepts the sheet labels and their English names.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "입금" | "deposit" => Some(DepositType::Deposit),
            "출금" | "withdrawal" | "withdraw" => Some(DepositType::Withdrawal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepositType::Deposit => "DEPOSIT",
            DepositType::Withdrawal => "WITHDRAWAL",
        }
    }
}

/// A cash movement into or out of the account. `amount` is never negative;
/// direction is carried by `deposit_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    pub date: NaiveDate,
    pub deposit_type: DepositType,
    pub amount: Decimal,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub source: RecordSource,
}

impl DepositRecord {
    /// Amount with withdrawals negated.
    pub fn signed_amount(&self) -> Decimal {
        match self.deposit_type {
            DepositType::Deposit => self.amount,
            DepositType::Withdrawal => -self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositKey {
    pub date: NaiveDate,
    pub deposit_type: DepositType,
    pub amount: Decimal,
}

impl fmt::Display for DepositKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.date.format("%Y-%m-%d"),
            self.deposit_type.as_str(),
            self.amount.normalize()
        )
    }
}

/// A position in the portfolio sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRecord {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub source: RecordSource,
}

/// Result of an append or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome<R> {
    /// One-based sheet row written, when known.
    pub row: Option<usize>,
    pub record: R,
}

/// Result of a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DeleteOutcome {
    /// The ledger row at this one-based sheet row was cleared.
    Deleted { row: usize },
    /// Only the mirror still had the record.
    MirrorOnly,
}

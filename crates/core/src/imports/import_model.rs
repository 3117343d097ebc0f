use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::LOCAL_CURRENCY;
use crate::ledger::{HoldingRecord, RecordSource};

/// A position read from a brokerage screenshot. Fields are as recognized;
/// nothing has been checked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCandidate {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

impl TradeCandidate {
    pub fn to_holding(&self) -> HoldingRecord {
        let currency = self
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(LOCAL_CURRENCY)
            .to_uppercase();

        HoldingRecord {
            symbol: self.symbol.trim().to_uppercase(),
            name: self.name.trim().to_string(),
            quantity: self.quantity,
            average_price: self.price,
            currency,
            source: RecordSource::Ledger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "status")]
pub enum ImportStatus {
    /// Written at this one-based sheet row, when the ledger reported it.
    Imported { row: Option<usize> },
    /// The symbol is already held.
    Duplicate,
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub candidate: TradeCandidate,
    #[serde(flatten)]
    pub status: ImportStatus,
}

impl ImportOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self.status, ImportStatus::Imported { .. })
    }
}

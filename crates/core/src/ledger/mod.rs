//! Ledger module - spreadsheet ranges treated as keyed, soft-deletable tables.

mod codec;
mod layout;
mod ledger_model;
mod ledger_traits;
pub mod locator;
mod memory_store;
mod mutator;

#[cfg(test)]
mod mutator_tests;

pub use codec::{parse_key_date, LedgerRecord, RowSkip, NATURAL_KEY_FIELD};
pub use layout::{
    AppendMode, LedgerLayout, BALANCE_LAYOUT, DEPOSIT_LAYOUT, DIVIDEND_LAYOUT, HOLDING_LAYOUT,
};
pub use ledger_model::{
    AccountBalanceRecord, DeleteOutcome, DepositKey, DepositRecord, DepositType, DividendKey,
    DividendRecord, HoldingRecord, MutationOutcome, RecordSource,
};
pub use ledger_traits::{column_letter, LedgerStore, RangeSpec};
pub use locator::{
    append_position, decode_records, find_by_key, find_first_empty_slot, find_last_valid_row,
};
pub use memory_store::InMemoryLedgerStore;
pub use mutator::LedgerMutator;

//! Sheetfolio Sheets - the spreadsheet values API as a ledger store.
//!
//! `SheetsApiClient` speaks the REST values API of one spreadsheet;
//! `SheetsLedgerStore` adapts it to the `LedgerStore` capability of
//! `sheetfolio-core`. Authentication is out of scope: callers pass an
//! already-issued bearer token.

mod client;
mod ledger_store;
mod models;

pub use client::{SheetsApiClient, DEFAULT_SHEETS_API_URL};
pub use ledger_store::{parse_updated_row, SheetsLedgerStore};
pub use models::{AppendResponse, UpdateResponse, ValueRange};

//! Sheetfolio Core - ledger reconciliation and financial time-series engine.
//!
//! The ledger of truth is a user-owned spreadsheet. This crate parses its
//! loosely-typed cells, locates and mutates rows by natural key, resolves
//! exchange rates through a tiered cache, and derives aggregate series.
//! It is storage-agnostic: the spreadsheet, the relational mirror and the
//! persistent rate tier are traits implemented by the `sheets` and
//! `storage-sqlite` crates.

pub mod cells;
pub mod constants;
pub mod enrich;
pub mod errors;
pub mod fx;
pub mod imports;
pub mod ledger;
pub mod mirror;
pub mod period;
pub mod series;
pub mod utils;

pub use cells::CellValue;
pub use period::YearMonth;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

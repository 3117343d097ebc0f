//! Imports module - trade candidates recognized from screenshots, appended
//! to the holdings ledger.

mod import_model;
mod import_service;
mod import_traits;

pub use import_model::{ImportOutcome, ImportStatus, TradeCandidate};
pub use import_service::{extract_and_import, import_trade_candidates};
pub use import_traits::TradeCandidateExtractor;

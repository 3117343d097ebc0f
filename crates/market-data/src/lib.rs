//! Sheetfolio Market Data Crate
//!
//! This crate provides provider-agnostic exchange rate fetching for the
//! Sheetfolio ledger engine.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Dated spot rate lookups against one or more endpoint providers
//! - Bulk historical rate documents (delimited text) fetched over HTTP
//! - Error classification so callers can degrade through fallback tiers
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  Rate cache      |  (sheetfolio-core, memory -> store -> provider -> fallback)
//! +------------------+
//!          |
//!          v
//! +------------------+     +----------------------+
//! |  FxRateProvider  |     | HistoricalRateSource |
//! +------------------+     +----------------------+
//!          |                          |
//!          v                          v
//! +------------------+     +----------------------+
//! |     FxQuote      |     |   raw CSV document   |
//! +------------------+     +----------------------+
//! ```
//!
//! # Core Types
//!
//! - [`FxQuote`] - A single dated exchange rate returned by a provider
//! - [`FxRateProvider`] - Trait implemented by dated rate endpoints
//! - [`HistoricalRateSource`] - Trait implemented by bulk document sources
//! - [`MarketDataError`] / [`RetryClass`] - Error taxonomy

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use models::{CurrencyPair, FxQuote};

pub use provider::currency_api::CurrencyApiProvider;
pub use provider::document::HttpDocumentSource;
pub use provider::{FxRateProvider, HistoricalRateSource};

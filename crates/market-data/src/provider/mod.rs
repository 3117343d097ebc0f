//! Exchange rate provider abstractions and implementations.
//!
//! This module contains:
//! - The `FxRateProvider` trait that dated rate endpoints implement
//! - The `HistoricalRateSource` trait for bulk historical documents
//! - Concrete implementations backed by HTTP
//!
//! Providers never cache. Tiering, staleness and fallbacks are the caller's
//! concern (see `sheetfolio_core::fx`).

mod traits;

pub mod currency_api;
pub mod document;

pub use traits::{FxRateProvider, HistoricalRateSource};

//! Market data models
//!
//! - `fx_quote` - A dated exchange rate observation and the currency pair it belongs to

mod fx_quote;

pub use fx_quote::{CurrencyPair, FxQuote};

//! Currency-adjusted index series rebased on a baseline month's rate.

mod index_layout;
mod rate_enricher;

pub use index_layout::{IndexBlockLayout, INDEX_LAYOUT};
pub use rate_enricher::{base_rate, enrich_index_rows, index_series, RateEnricher};

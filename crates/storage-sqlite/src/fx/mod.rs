//! SQLite storage for the persistent exchange rate tier.

mod model;
mod repository;

pub use model::RateCacheDB;
pub use repository::SqliteRateStore;

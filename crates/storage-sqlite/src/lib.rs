//! SQLite storage for Sheetfolio.
//!
//! Implements the two persistence capabilities `sheetfolio-core` leaves
//! abstract: the relational mirror of the ledger sheets (`MirrorStore`) and
//! the persistent exchange-rate tier (`RateStore`). Diesel is confined to
//! this crate.
//!
//! ```text
//!   core (ledger, fx)
//!          │  MirrorStore / RateStore
//!          ▼
//!   storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod fx;
pub mod mirror;
pub mod schema;

pub use db::{
    create_pool, ensure_db_dir, get_connection, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use fx::SqliteRateStore;
pub use mirror::SqliteMirrorStore;

pub use sheetfolio_core::errors::{DatabaseError, Error, Result};

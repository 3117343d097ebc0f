//! SQLite storage for the relational mirror of the ledgers.

mod model;
mod repository;

pub use model::MirrorRowDB;
pub use repository::SqliteMirrorStore;

//! Core error types for Sheetfolio.
//!
//! This module defines storage-agnostic error types. Spreadsheet transport
//! errors and SQLite errors are converted to these types by the adapter
//! crates.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use sheetfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger engine.
///
/// Row-level parse failures are deliberately absent: an unusable row is
/// skipped by the locator (see `ledger::RowSkip`) and never aborts a scan.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    /// A record with the same natural key already exists.
    #[error("A record for {0} already exists")]
    DuplicateKey(String),

    /// No row matches the requested natural key.
    #[error("Nothing to update: no record for {0}")]
    NotFound(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Mirror operation failed: {0}")]
    Mirror(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised by a ledger store implementation.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to read range {range}: {message}")]
    ReadFailed { range: String, message: String },

    #[error("Failed to write range {range}: {message}")]
    WriteFailed { range: String, message: String },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Ledger transport error: {0}")]
    Transport(String),
}

/// Storage-agnostic error type for the relational mirror and rate store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Amount for '{0}' must not be negative")]
    NegativeAmount(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl Error {
    /// True for conflicts the caller should show as "already exists".
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateKey(_))
    }

    /// True when nothing matched the requested key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

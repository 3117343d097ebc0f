use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal precision for display values
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision for index values written back to the sheet
pub const INDEX_DECIMAL_PRECISION: u32 = 4;

/// Two local-currency amounts closer than this are the same amount.
pub const LOCAL_AMOUNT_EPSILON: Decimal = dec!(1);

/// Two foreign-currency amounts closer than this are the same amount.
pub const FOREIGN_AMOUNT_EPSILON: Decimal = dec!(0.01);

/// Rate used to value foreign dividends when no period rate is known.
pub const DEFAULT_DIVIDEND_RATE: Decimal = dec!(1350);

/// Rolling average window in months.
pub const ROLLING_WINDOW_MONTHS: usize = 12;

/// Local (ledger) currency.
pub const LOCAL_CURRENCY: &str = "KRW";

/// Foreign currency of dividend and index rows.
pub const FOREIGN_CURRENCY: &str = "USD";

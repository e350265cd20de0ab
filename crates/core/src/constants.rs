use rust_decimal::Decimal;

/// Balance credited to an account the first time it is referenced
pub const DEFAULT_ACCOUNT_BALANCE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Starting balance used by a backtest when the caller does not provide one
pub const DEFAULT_BACKTEST_BALANCE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Header row of a positions export/import
pub const POSITIONS_CSV_HEADER: [&str; 2] = ["symbol", "qty"];

/// Header row of a trade history export/import
pub const TRADES_CSV_HEADER: [&str; 5] = ["symbol", "qty", "price", "side", "timestamp"];

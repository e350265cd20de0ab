use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by ledger operations.
///
/// Every variant except `StoreCorrupted` describes a rejected request that
/// left the store untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        held: u64,
    },

    #[error("Position in {symbol} cannot grow past {held} + {requested} shares")]
    PositionOverflow {
        symbol: String,
        held: u64,
        requested: u64,
    },

    #[error("Invalid side '{0}': expected 'buy' or 'sell'")]
    InvalidSide(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    #[error("Price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Price series is empty")]
    EmptyPriceSeries,

    #[error("Malformed import row {row}: {message}")]
    MalformedImportRow { row: usize, message: String },

    #[error("Ledger store is corrupted: {0}")]
    StoreCorrupted(String),
}

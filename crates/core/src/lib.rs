//! Paper Trading Core - domain entities, services, and traits.
//!
//! This crate contains the business logic of the paper trading ledger:
//! virtual balances and positions, trade execution, CSV import/export,
//! performance reporting and buy-and-hold backtests. It is storage-agnostic
//! and defines the `LedgerStoreTrait` implemented by the `storage-json` and
//! `storage-sqlite` crates.

pub mod backtest;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod market_data;
pub mod portfolio;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

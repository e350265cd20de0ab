//! Ledger module - account models, the account engine, and the store contract.

mod csv_export;
mod csv_parser;
mod import_model;
mod ledger_errors;
mod ledger_model;
mod ledger_service;
mod ledger_traits;
mod ledger_writer;
mod memory_store;


pub use csv_export::{write_positions_csv, write_trades_csv};
pub use csv_parser::{parse_positions_csv, parse_trades_csv};
pub use import_model::{ImportRowError, ImportSummary, PositionImportRow, TradeImportRow};
pub use ledger_errors::LedgerError;
pub use ledger_model::{
    format_timestamp, normalize_symbol, parse_ledger, parse_timestamp, Account, Ledger, NewTrade,
    Trade, TradeOutcome, TradeSide,
};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerServiceTrait, LedgerStoreTrait};
pub use ledger_writer::LedgerWriter;
pub use memory_store::InMemoryLedgerStore;

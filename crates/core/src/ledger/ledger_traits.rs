//! Ledger store and service traits.
//!
//! These traits define the contract for ledger operations without any
//! storage-specific types, allowing for different storage implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::import_model::{ImportSummary, PositionImportRow, TradeImportRow};
use super::ledger_model::{Ledger, NewTrade, TradeOutcome};
use crate::errors::Result;

/// Durable mapping from user id to account.
///
/// The whole ledger is the unit of persistence: it is loaded in full and
/// replaced in full.
pub trait LedgerStoreTrait: Send + Sync {
    /// Returns the current ledger, or an empty one when nothing was ever saved.
    ///
    /// Unparsable persisted data must surface as `LedgerError::StoreCorrupted`.
    fn load(&self) -> Result<Ledger>;

    /// Replaces the persisted ledger.
    ///
    /// A concurrent or subsequent `load` observes either the previous or the
    /// new ledger, never a partially written one.
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Account engine: every mutation of an account goes through this trait.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Executes a virtual buy or sell.
    async fn place_trade(&self, user_id: &str, new_trade: NewTrade) -> Result<TradeOutcome>;

    /// Adds a (possibly negative) amount to the cash balance and returns the new balance.
    async fn add_funds(&self, user_id: &str, amount: Decimal) -> Result<Decimal>;

    /// Sets position quantities from the given rows. Balance and trades are untouched.
    async fn import_positions(
        &self,
        user_id: &str,
        rows: Vec<PositionImportRow>,
    ) -> Result<ImportSummary>;

    /// Appends the given rows to the trade history verbatim.
    async fn import_trade_history(
        &self,
        user_id: &str,
        rows: Vec<TradeImportRow>,
    ) -> Result<ImportSummary>;

    /// Parses a `symbol,qty` CSV and imports it as positions.
    async fn import_positions_csv(&self, user_id: &str, content: &[u8]) -> Result<ImportSummary>;

    /// Parses a `symbol,qty,price,side,timestamp` CSV and imports it as trade history.
    async fn import_trade_history_csv(
        &self,
        user_id: &str,
        content: &[u8],
    ) -> Result<ImportSummary>;

    /// Exports the positions as CSV, header first.
    fn export_positions(&self, user_id: &str) -> Result<String>;

    /// Exports the trade history as CSV, header first.
    fn export_trade_history(&self, user_id: &str) -> Result<String>;
}

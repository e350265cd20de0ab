use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::csv_export::{write_positions_csv, write_trades_csv};
use super::csv_parser::{parse_positions_csv, parse_trades_csv};
use super::import_model::{ImportRowError, ImportSummary, PositionImportRow, TradeImportRow};
use super::ledger_model::{NewTrade, TradeOutcome};
use super::ledger_traits::{LedgerServiceTrait, LedgerStoreTrait};
use super::ledger_writer::LedgerWriter;
use crate::errors::Result;

/// Account engine over a ledger store.
///
/// Mutations are submitted to the store's `LedgerWriter`; exports read the
/// store directly.
pub struct LedgerService {
    store: Arc<dyn LedgerStoreTrait>,
    writer: LedgerWriter,
}

impl LedgerService {
    /// Creates a service with its own writer task. Must be called within a Tokio runtime.
    pub fn new(store: Arc<dyn LedgerStoreTrait>) -> Self {
        let writer = LedgerWriter::spawn(store.clone());
        Self { store, writer }
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn place_trade(&self, user_id: &str, new_trade: NewTrade) -> Result<TradeOutcome> {
        let order = new_trade.validate()?;
        let user = user_id.to_string();

        let outcome = self
            .writer
            .exec(move |ledger| {
                let mut account = ledger.get(&user).cloned().unwrap_or_default();
                let trade = account.execute(&order, Utc::now())?;
                let outcome = TradeOutcome {
                    trade,
                    balance: account.balance,
                    positions: account.positions.clone(),
                };
                ledger.insert(user, account);
                Ok(outcome)
            })
            .await?;

        debug!(
            "Executed {} {} x {} @ {} for user {}; balance now {}",
            outcome.trade.side,
            outcome.trade.symbol,
            outcome.trade.qty,
            outcome.trade.price,
            user_id,
            outcome.balance
        );
        Ok(outcome)
    }

    async fn add_funds(&self, user_id: &str, amount: Decimal) -> Result<Decimal> {
        let user = user_id.to_string();

        let balance = self
            .writer
            .exec(move |ledger| {
                let mut account = ledger.get(&user).cloned().unwrap_or_default();
                let balance = account.deposit(amount)?;
                ledger.insert(user, account);
                Ok(balance)
            })
            .await?;

        debug!("Added {} to user {}; balance now {}", amount, user_id, balance);
        Ok(balance)
    }

    async fn import_positions(
        &self,
        user_id: &str,
        rows: Vec<PositionImportRow>,
    ) -> Result<ImportSummary> {
        let total = rows.len();
        let mut valid = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            match row.parse(index) {
                Ok(position) => valid.push(position),
                Err(e) => {
                    warn!("Skipping position import row for user {}: {}", user_id, e);
                    errors.push(ImportRowError::from(e));
                }
            }
        }

        let imported = valid.len();
        if imported > 0 {
            let user = user_id.to_string();
            self.writer
                .exec(move |ledger| {
                    let account = ledger.entry(user).or_default();
                    account.positions.extend(valid);
                    Ok(())
                })
                .await?;
        }

        debug!(
            "Imported {} of {} position rows for user {}",
            imported, total, user_id
        );
        Ok(ImportSummary::new(total, imported, errors))
    }

    async fn import_trade_history(
        &self,
        user_id: &str,
        rows: Vec<TradeImportRow>,
    ) -> Result<ImportSummary> {
        let total = rows.len();
        let mut valid = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            match row.parse(index) {
                Ok(trade) => valid.push(trade),
                Err(e) => {
                    warn!("Skipping trade import row for user {}: {}", user_id, e);
                    errors.push(ImportRowError::from(e));
                }
            }
        }

        let imported = valid.len();
        if imported > 0 {
            let user = user_id.to_string();
            self.writer
                .exec(move |ledger| {
                    let account = ledger.entry(user).or_default();
                    account.trades.extend(valid);
                    Ok(())
                })
                .await?;
        }

        debug!(
            "Imported {} of {} trade rows for user {}",
            imported, total, user_id
        );
        Ok(ImportSummary::new(total, imported, errors))
    }

    async fn import_positions_csv(&self, user_id: &str, content: &[u8]) -> Result<ImportSummary> {
        let rows = parse_positions_csv(content)?;
        self.import_positions(user_id, rows).await
    }

    async fn import_trade_history_csv(
        &self,
        user_id: &str,
        content: &[u8],
    ) -> Result<ImportSummary> {
        let rows = parse_trades_csv(content)?;
        self.import_trade_history(user_id, rows).await
    }

    fn export_positions(&self, user_id: &str) -> Result<String> {
        let ledger = self.store.load()?;
        match ledger.get(user_id) {
            Some(account) => write_positions_csv(&account.positions),
            None => write_positions_csv(&Default::default()),
        }
    }

    fn export_trade_history(&self, user_id: &str) -> Result<String> {
        let ledger = self.store.load()?;
        match ledger.get(user_id) {
            Some(account) => write_trades_csv(&account.trades),
            None => write_trades_csv(&[]),
        }
    }
}

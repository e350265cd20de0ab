use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use std::sync::Arc;

use super::performance_model::PerformanceSnapshot;
use crate::errors::{Error, Result};
use crate::ledger::{Account, LedgerStoreTrait, Trade};
use crate::market_data::PriceSourceTrait;
use crate::portfolio::valuation::{
    average_cost, summarize_valuation, value_holding, PortfolioValuation,
};

/// Read-only reporting over the ledger. None of these operations write to the
/// store or create accounts.
#[async_trait]
pub trait PerformanceServiceTrait: Send + Sync {
    /// Trade history in execution order; empty for an unknown user.
    fn get_history(&self, user_id: &str) -> Result<Vec<Trade>>;

    /// Balance and positions; an unknown user reports the defaults of a new account.
    fn get_performance(&self, user_id: &str) -> Result<PerformanceSnapshot>;

    /// Values every non-zero position at its current market price.
    ///
    /// Symbols whose price cannot be fetched are left out of the totals and
    /// listed in `unpriced_symbols`.
    async fn get_valuation(&self, user_id: &str) -> Result<PortfolioValuation>;
}

#[derive(Clone)]
pub struct PerformanceService {
    store: Arc<dyn LedgerStoreTrait>,
    price_source: Arc<dyn PriceSourceTrait>,
}

impl PerformanceService {
    pub fn new(store: Arc<dyn LedgerStoreTrait>, price_source: Arc<dyn PriceSourceTrait>) -> Self {
        Self {
            store,
            price_source,
        }
    }

    fn load_account(&self, user_id: &str) -> Result<Account> {
        let ledger = self.store.load()?;
        Ok(ledger.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PerformanceServiceTrait for PerformanceService {
    fn get_history(&self, user_id: &str) -> Result<Vec<Trade>> {
        let ledger = self.store.load()?;
        Ok(ledger
            .get(user_id)
            .map(|account| account.trades.clone())
            .unwrap_or_default())
    }

    fn get_performance(&self, user_id: &str) -> Result<PerformanceSnapshot> {
        let account = self.load_account(user_id)?;
        Ok(PerformanceSnapshot::from(&account))
    }

    async fn get_valuation(&self, user_id: &str) -> Result<PortfolioValuation> {
        let account = self.load_account(user_id)?;
        let held: Vec<(&String, u64)> = account
            .positions
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(symbol, qty)| (symbol, *qty))
            .collect();

        let prices = join_all(
            held.iter()
                .map(|(symbol, _)| self.price_source.fetch_price(symbol)),
        )
        .await;

        let mut holdings = Vec::with_capacity(held.len());
        let mut unpriced = Vec::new();
        for ((symbol, qty), price) in held.into_iter().zip(prices) {
            match price {
                Ok(price) => {
                    match value_holding(symbol, qty, average_cost(&account.trades, symbol), price)
                    {
                        Some(holding) => holdings.push(holding),
                        None => {
                            warn!(
                                "Value of {} x {} @ {} for user {} overflows. Leaving it out of the totals.",
                                qty, symbol, price, user_id
                            );
                            unpriced.push(symbol.clone());
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "No price for {} while valuing user {}: {}. Leaving it out of the totals.",
                        symbol, user_id, e
                    );
                    unpriced.push(symbol.clone());
                }
            }
        }

        debug!(
            "Valued {} holdings for user {} ({} unpriced)",
            holdings.len(),
            user_id,
            unpriced.len()
        );
        summarize_valuation(holdings, account.balance, unpriced).ok_or_else(|| {
            Error::Unexpected(format!(
                "Portfolio value of user {} is too large to total",
                user_id
            ))
        })
    }
}

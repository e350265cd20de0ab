use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input of a buy-and-hold backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    /// Chronological closing prices; the first is the entry price and the last the exit price.
    pub prices: Vec<Decimal>,
    /// Starting cash, `DEFAULT_BACKTEST_BALANCE` when omitted.
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
}

/// Outcome of a buy-and-hold backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    pub profit: Decimal,
}

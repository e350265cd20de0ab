//! Portfolio valuation domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market valuation of one held position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub symbol: String,
    pub quantity: u64,
    /// Quantity-weighted mean price of the account's buys of this symbol
    pub average_cost: Decimal,
    pub invested: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
}

/// Market valuation of a whole account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub holdings: Vec<HoldingValuation>,
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    pub total_profit: Decimal,
    pub profit_percent: Decimal,
    pub cash_balance: Decimal,
    /// Held symbols left out of the totals because no price was available
    pub unpriced_symbols: Vec<String>,
}

use rust_decimal::Decimal;

use super::valuation_model::{HoldingValuation, PortfolioValuation};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::ledger::{Trade, TradeSide};

/// Quantity-weighted mean price of the buys of `symbol`.
///
/// `None` when there are no buys or the totals do not fit a `Decimal`.
pub fn average_cost(trades: &[Trade], symbol: &str) -> Option<Decimal> {
    let mut quantity = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    for trade in trades
        .iter()
        .filter(|trade| trade.side == TradeSide::Buy && trade.symbol == symbol)
    {
        quantity = quantity.checked_add(Decimal::from(trade.qty))?;
        cost = cost.checked_add(trade.notional()?)?;
    }

    if quantity.is_zero() {
        None
    } else {
        cost.checked_div(quantity)
    }
}

/// Values a position at `current_price`, `None` if the amounts overflow.
///
/// Without buy history the current price stands in for the average cost,
/// which reports the holding at zero profit.
pub fn value_holding(
    symbol: &str,
    quantity: u64,
    average_cost: Option<Decimal>,
    current_price: Decimal,
) -> Option<HoldingValuation> {
    let average_cost = average_cost.unwrap_or(current_price);
    let qty = Decimal::from(quantity);
    let invested = qty.checked_mul(average_cost)?;
    let current_value = qty.checked_mul(current_price)?;
    let profit = current_value.checked_sub(invested)?;

    Some(HoldingValuation {
        symbol: symbol.to_string(),
        quantity,
        average_cost,
        invested,
        current_price,
        current_value,
        profit,
        profit_percent: percent_of(profit, invested)?,
    })
}

/// Totals the priced holdings of an account, `None` if the totals overflow.
pub fn summarize_valuation(
    holdings: Vec<HoldingValuation>,
    cash_balance: Decimal,
    unpriced_symbols: Vec<String>,
) -> Option<PortfolioValuation> {
    let mut total_invested = Decimal::ZERO;
    let mut total_current_value = Decimal::ZERO;
    for holding in &holdings {
        total_invested = total_invested.checked_add(holding.invested)?;
        total_current_value = total_current_value.checked_add(holding.current_value)?;
    }
    let total_profit = total_current_value.checked_sub(total_invested)?;

    Some(PortfolioValuation {
        profit_percent: percent_of(total_profit, total_invested)?,
        holdings,
        total_invested,
        total_current_value,
        total_profit,
        cash_balance,
        unpriced_symbols,
    })
}

/// `part / whole` as a percentage, zero when `whole` is zero.
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    let percent = part
        .checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(percent.round_dp(DISPLAY_DECIMAL_PRECISION))
}

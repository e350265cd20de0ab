use log::debug;
use rust_decimal::Decimal;

use super::backtest_model::{BacktestRequest, BacktestResult};
use crate::constants::DEFAULT_BACKTEST_BALANCE;
use crate::errors::{Error, Result, ValidationError};
use crate::ledger::LedgerError;

/// Simulates buying as many whole shares as possible at the first price and
/// holding them until the last price. Leftover cash stays uninvested.
///
/// Fails with `EmptyPriceSeries` when there are no prices, and with a
/// validation error for a non-positive price or a negative starting balance.
pub fn backtest(prices: &[Decimal], initial_balance: Decimal) -> Result<BacktestResult> {
    let (entry, exit) = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(LedgerError::EmptyPriceSeries.into()),
    };

    if initial_balance < Decimal::ZERO {
        return Err(invalid(format!(
            "Initial balance must not be negative, got {}",
            initial_balance
        )));
    }
    if let Some((index, price)) = prices
        .iter()
        .enumerate()
        .find(|(_, price)| **price <= Decimal::ZERO)
    {
        return Err(invalid(format!(
            "Price at index {} must be positive, got {}",
            index, price
        )));
    }

    let too_large = || invalid("Backtest amounts are too large to simulate".to_string());
    let shares = initial_balance
        .checked_div(entry)
        .ok_or_else(too_large)?
        .floor();
    let cash = initial_balance - shares * entry;
    let final_balance = shares
        .checked_mul(exit)
        .and_then(|value| value.checked_add(cash))
        .ok_or_else(too_large)?;

    debug!(
        "Backtest over {} prices: {} shares at {} -> {}",
        prices.len(),
        shares,
        entry,
        exit
    );

    Ok(BacktestResult {
        initial_balance,
        final_balance,
        profit: final_balance - initial_balance,
    })
}

/// Runs a backtest request, applying the default starting balance.
pub fn run_backtest(request: &BacktestRequest) -> Result<BacktestResult> {
    backtest(
        &request.prices,
        request.initial_balance.unwrap_or(DEFAULT_BACKTEST_BALANCE),
    )
}

fn invalid(message: String) -> Error {
    Error::Validation(ValidationError::InvalidInput(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_and_hold_gain() {
        let result = backtest(&[dec!(100), dec!(150)], dec!(1000)).unwrap();
        assert_eq!(
            result,
            BacktestResult {
                initial_balance: dec!(1000),
                final_balance: dec!(1500),
                profit: dec!(500),
            }
        );
    }

    #[test]
    fn test_only_first_and_last_prices_matter() {
        let result = backtest(&[dec!(10), dec!(1), dec!(500), dec!(8)], dec!(100)).unwrap();
        assert_eq!(result.final_balance, dec!(80));
        assert_eq!(result.profit, dec!(-20));
    }

    #[test]
    fn test_leftover_cash_is_kept() {
        // 3 shares at 30, 10 left in cash
        let result = backtest(&[dec!(30), dec!(40)], dec!(100)).unwrap();
        assert_eq!(result.final_balance, dec!(130));
        assert_eq!(result.profit, dec!(30));
    }

    #[test]
    fn test_single_price_has_no_profit() {
        let result = backtest(&[dec!(33.3)], dec!(1000)).unwrap();
        assert_eq!(result.final_balance, dec!(1000));
        assert_eq!(result.profit, Decimal::ZERO);
    }

    #[test]
    fn test_balance_below_first_price_buys_nothing() {
        let result = backtest(&[dec!(500), dec!(900)], dec!(100)).unwrap();
        assert_eq!(result.final_balance, dec!(100));
        assert_eq!(result.profit, Decimal::ZERO);
    }

    #[test]
    fn test_empty_series_fails() {
        let err = backtest(&[], dec!(1000)).unwrap_err();
        assert!(matches!(err, Error::Ledger(LedgerError::EmptyPriceSeries)));
    }

    #[test]
    fn test_invalid_inputs_fail_validation() {
        assert!(matches!(
            backtest(&[Decimal::ZERO, dec!(10)], dec!(1000)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            backtest(&[dec!(10), dec!(-1)], dec!(1000)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            backtest(&[dec!(10)], dec!(-1)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_overflowing_outcome_fails_validation() {
        assert!(matches!(
            backtest(&[dec!(1), Decimal::MAX], dec!(2)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_request_defaults_initial_balance() {
        let request = BacktestRequest {
            prices: vec![dec!(100), dec!(110)],
            initial_balance: None,
        };
        let result = run_backtest(&request).unwrap();
        assert_eq!(result.initial_balance, dec!(1000000));
        assert_eq!(result.final_balance, dec!(1100000));
    }

    #[test]
    fn test_backtest_is_deterministic() {
        let prices = [dec!(12.5), dec!(13.75), dec!(11)];
        assert_eq!(
            backtest(&prices, dec!(999.99)).unwrap(),
            backtest(&prices, dec!(999.99)).unwrap()
        );
    }
}

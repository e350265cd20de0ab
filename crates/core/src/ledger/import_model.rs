//! Bulk import rows and results.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ledger_errors::LedgerError;
use super::ledger_model::{normalize_symbol, parse_timestamp, Trade, TradeSide};

/// One raw `symbol,qty` row of a positions import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionImportRow {
    pub symbol: String,
    pub qty: String,
}

impl PositionImportRow {
    pub fn new(symbol: impl Into<String>, qty: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            qty: qty.into(),
        }
    }

    /// Validates the row; `row` is its index in the submitted batch.
    pub(crate) fn parse(&self, row: usize) -> Result<(String, u64), LedgerError> {
        let symbol = normalize_symbol(&self.symbol).map_err(|e| malformed(row, e))?;
        let qty = coerce_quantity(&self.qty)
            .map_err(|message| LedgerError::MalformedImportRow { row, message })?;
        Ok((symbol, qty))
    }
}

/// One raw `symbol,qty,price,side,timestamp` row of a trade history import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeImportRow {
    pub symbol: String,
    pub qty: String,
    pub price: String,
    pub side: String,
    pub timestamp: String,
}

impl TradeImportRow {
    pub(crate) fn parse(&self, row: usize) -> Result<Trade, LedgerError> {
        let symbol = normalize_symbol(&self.symbol).map_err(|e| malformed(row, e))?;
        let qty = coerce_quantity(&self.qty)
            .map_err(|message| LedgerError::MalformedImportRow { row, message })?;
        if qty == 0 {
            return Err(LedgerError::MalformedImportRow {
                row,
                message: "qty must be positive".to_string(),
            });
        }
        let price = Decimal::from_str(self.price.trim()).map_err(|_| {
            LedgerError::MalformedImportRow {
                row,
                message: format!("price '{}' is not a number", self.price),
            }
        })?;
        let side = TradeSide::from_str(&self.side).map_err(|e| malformed(row, e))?;
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            LedgerError::MalformedImportRow {
                row,
                message: format!("timestamp '{}' is not an ISO-8601 instant", self.timestamp),
            }
        })?;
        Trade::new(symbol, qty, price, side, timestamp).map_err(|e| malformed(row, e))
    }
}

/// Per-row failure recorded during an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    /// Index of the row in the submitted batch (0-based, header excluded)
    pub row_index: usize,
    pub message: String,
}

impl From<LedgerError> for ImportRowError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::MalformedImportRow { row, message } => Self {
                row_index: row,
                message,
            },
            other => Self {
                row_index: 0,
                message: other.to_string(),
            },
        }
    }
}

/// Summary statistics for an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Number of rows in the import request
    pub total: usize,
    /// Number of rows applied to the account
    pub imported: usize,
    /// Number of rows skipped because they were malformed
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
    /// Whether every row was applied
    pub success: bool,
}

impl ImportSummary {
    pub(crate) fn new(total: usize, imported: usize, errors: Vec<ImportRowError>) -> Self {
        Self {
            total,
            imported,
            skipped: errors.len(),
            success: errors.is_empty(),
            errors,
        }
    }
}

fn malformed(row: usize, err: LedgerError) -> LedgerError {
    LedgerError::MalformedImportRow {
        row,
        message: err.to_string(),
    }
}

/// Coerces a quantity cell to a non-negative integer, truncating fractions.
fn coerce_quantity(raw: &str) -> Result<u64, String> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| format!("qty '{}' is not a number", raw))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("qty must not be negative, got {}", value));
    }
    value
        .trunc()
        .to_u64()
        .ok_or_else(|| format!("qty '{}' is out of range", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_position_row_coerces_fractional_quantity() {
        let row = PositionImportRow::new(" aapl ", "12.9");
        assert_eq!(row.parse(0).unwrap(), ("AAPL".to_string(), 12));
    }

    #[test]
    fn test_position_row_accepts_zero() {
        let row = PositionImportRow::new("TSLA", "0");
        assert_eq!(row.parse(3).unwrap(), ("TSLA".to_string(), 0));
    }

    #[test]
    fn test_position_row_rejects_negative_quantity() {
        let err = PositionImportRow::new("TSLA", "-4").parse(2).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedImportRow { row: 2, .. }));
    }

    #[test]
    fn test_position_row_rejects_garbage_quantity() {
        let err = PositionImportRow::new("TSLA", "lots").parse(1).unwrap_err();
        assert_eq!(
            err,
            LedgerError::MalformedImportRow {
                row: 1,
                message: "qty 'lots' is not a number".to_string()
            }
        );
    }

    #[test]
    fn test_trade_row_parses_naive_timestamp_as_utc() {
        let row = TradeImportRow {
            symbol: "msft".to_string(),
            qty: "3".to_string(),
            price: "410.25".to_string(),
            side: "BUY".to_string(),
            timestamp: "2024-05-01T14:30:00.123456".to_string(),
        };
        let trade = row.parse(0).unwrap();
        assert_eq!(trade.symbol, "MSFT");
        assert_eq!(trade.qty, 3);
        assert_eq!(trade.price, dec!(410.25));
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(
            super::super::ledger_model::format_timestamp(&trade.timestamp),
            "2024-05-01T14:30:00.123456Z"
        );
    }

    #[test]
    fn test_trade_row_rejects_bad_side_and_price() {
        let mut row = TradeImportRow {
            symbol: "MSFT".to_string(),
            qty: "3".to_string(),
            price: "0".to_string(),
            side: "buy".to_string(),
            timestamp: "2024-05-01T14:30:00Z".to_string(),
        };
        assert!(row.parse(0).is_err());

        row.price = "10".to_string();
        row.side = "hold".to_string();
        let err = row.parse(4).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedImportRow { row: 4, .. }));
    }

    #[test]
    fn test_summary_counts() {
        let summary = ImportSummary::new(
            3,
            2,
            vec![ImportRowError {
                row_index: 1,
                message: "bad".to_string(),
            }],
        );
        assert_eq!(summary.skipped, 1);
        assert!(!summary.success);
    }
}

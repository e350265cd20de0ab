//! CSV parsing for position and trade history imports.
//!
//! The first non-empty row is the header. Columns are matched by name
//! (case-insensitive, with a few common aliases); a column whose name is
//! missing falls back to its position in the fixed layout.

use csv::{ReaderBuilder, Terminator, Trim};

use super::import_model::{PositionImportRow, TradeImportRow};
use crate::errors::{Error, ValidationError};
use crate::Result;

const SYMBOL_ALIASES: &[&str] = &["symbol", "ticker"];
const QTY_ALIASES: &[&str] = &["qty", "quantity", "shares"];
const PRICE_ALIASES: &[&str] = &["price", "unit_price", "unitprice"];
const SIDE_ALIASES: &[&str] = &["side", "action", "type"];
const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "date", "time", "datetime"];

/// Parses a `symbol,qty` CSV into import rows.
pub fn parse_positions_csv(content: &[u8]) -> Result<Vec<PositionImportRow>> {
    let table = read_table(content)?;
    let columns = table.resolve(&[SYMBOL_ALIASES, QTY_ALIASES]);

    Ok(table
        .rows
        .iter()
        .map(|row| PositionImportRow {
            symbol: cell(row, columns[0]),
            qty: cell(row, columns[1]),
        })
        .collect())
}

/// Parses a `symbol,qty,price,side,timestamp` CSV into import rows.
pub fn parse_trades_csv(content: &[u8]) -> Result<Vec<TradeImportRow>> {
    let table = read_table(content)?;
    let columns = table.resolve(&[
        SYMBOL_ALIASES,
        QTY_ALIASES,
        PRICE_ALIASES,
        SIDE_ALIASES,
        TIMESTAMP_ALIASES,
    ]);

    Ok(table
        .rows
        .iter()
        .map(|row| TradeImportRow {
            symbol: cell(row, columns[0]),
            qty: cell(row, columns[1]),
            price: cell(row, columns[2]),
            side: cell(row, columns[3]),
            timestamp: cell(row, columns[4]),
        })
        .collect())
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Maps each expected column to an index in the rows.
    fn resolve(&self, expected: &[&[&str]]) -> Vec<usize> {
        expected
            .iter()
            .enumerate()
            .map(|(position, aliases)| {
                self.headers
                    .iter()
                    .position(|header| aliases.iter().any(|alias| header == alias))
                    .unwrap_or(position)
            })
            .collect()
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn read_table(content: &[u8]) -> Result<Table> {
    // Strip a UTF-8 BOM (EF BB BF) left by spreadsheet exports
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    let text = std::str::from_utf8(content).map_err(|e| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "CSV file is not valid UTF-8: {}",
            e
        )))
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let row: Vec<String> = record?
            .iter()
            .map(|s| s.trim_end_matches('\r').to_string())
            .collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        records.push(row);
    }

    let mut records = records.into_iter();
    let headers = records
        .next()
        .ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(
                "CSV file is empty or contains no valid records".to_string(),
            ))
        })?
        .into_iter()
        .map(|header| header.to_ascii_lowercase())
        .collect();

    Ok(Table {
        headers,
        rows: records.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions_in_fixed_order() {
        let rows = parse_positions_csv(b"symbol,qty\nAAPL,10\nMSFT,5\n").unwrap();
        assert_eq!(
            rows,
            vec![
                PositionImportRow::new("AAPL", "10"),
                PositionImportRow::new("MSFT", "5")
            ]
        );
    }

    #[test]
    fn test_parse_positions_matches_columns_by_name() {
        let rows = parse_positions_csv(b"Quantity,Ticker\n7,NVDA").unwrap();
        assert_eq!(rows, vec![PositionImportRow::new("NVDA", "7")]);
    }

    #[test]
    fn test_parse_handles_bom_crlf_and_blank_lines() {
        let rows =
            parse_positions_csv(b"\xEF\xBB\xBFsymbol,qty\r\nAAPL,10\r\n\r\n,\r\nTSLA,2\r\n")
                .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], PositionImportRow::new("TSLA", "2"));
    }

    #[test]
    fn test_parse_short_rows_are_padded() {
        let rows = parse_trades_csv(b"symbol,qty,price,side,timestamp\nAAPL,1,100").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, "100");
        assert_eq!(rows[0].side, "");
        assert_eq!(rows[0].timestamp, "");
    }

    #[test]
    fn test_parse_trades_with_quoted_fields() {
        let rows = parse_trades_csv(
            b"symbol,qty,price,side,timestamp\n\"BRK.B\",2,\"410.5\",sell,2024-01-02T10:00:00Z",
        )
        .unwrap();
        assert_eq!(rows[0].symbol, "BRK.B");
        assert_eq!(rows[0].price, "410.5");
        assert_eq!(rows[0].side, "sell");
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = parse_positions_csv(b"symbol,qty\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(parse_positions_csv(b"").is_err());
        assert!(parse_trades_csv(b"\n\n").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = parse_positions_csv(b"symbol,qty\nA\xFFPL,10\n").unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidInput(_))));
    }
}

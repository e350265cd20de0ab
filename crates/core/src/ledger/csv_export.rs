//! CSV export of positions and trade history.

use std::collections::BTreeMap;

use csv::Writer;

use super::ledger_model::{format_timestamp, Trade};
use crate::constants::{POSITIONS_CSV_HEADER, TRADES_CSV_HEADER};
use crate::errors::{Error, Result};

/// Writes `symbol,qty` rows in symbol order, header first.
pub fn write_positions_csv(positions: &BTreeMap<String, u64>) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(POSITIONS_CSV_HEADER)?;
    for (symbol, qty) in positions {
        writer.write_record([symbol.as_str(), qty.to_string().as_str()])?;
    }
    finish(writer)
}

/// Writes `symbol,qty,price,side,timestamp` rows in stored order, header first.
pub fn write_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(TRADES_CSV_HEADER)?;
    for trade in trades {
        writer.write_record([
            trade.symbol.clone(),
            trade.qty.to_string(),
            trade.price.normalize().to_string(),
            trade.side.to_string(),
            format_timestamp(&trade.timestamp),
        ])?;
    }
    finish(writer)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Unexpected(format!("Failed to flush CSV export: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Unexpected(format!("CSV export is not valid UTF-8: {}", e)))
}

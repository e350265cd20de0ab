//! Ledger domain models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ledger_errors::LedgerError;
use crate::constants::DEFAULT_ACCOUNT_BALANCE;

/// Full persisted state: user id -> account.
///
/// A `BTreeMap` keeps the persisted document and exports in a stable order.
pub type Ledger = BTreeMap<String, Account>;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            _ => Err(LedgerError::InvalidSide(s.to_string())),
        }
    }
}

/// Immutable record of one executed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub qty: u64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub side: TradeSide,
    #[serde(with = "iso_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    /// Builds a trade, rejecting shapes that can never appear in a valid ledger.
    pub fn new(
        symbol: impl Into<String>,
        qty: u64,
        price: Decimal,
        side: TradeSide,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let trade = Self {
            symbol: symbol.into(),
            qty,
            price,
            side,
            timestamp,
        };
        trade.validate()?;
        Ok(trade)
    }

    /// Total value of the trade (qty x price), `None` when it does not fit a `Decimal`.
    pub fn notional(&self) -> Option<Decimal> {
        Decimal::from(self.qty).checked_mul(self.price)
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.symbol.trim().is_empty() {
            return Err(LedgerError::EmptySymbol);
        }
        if self.qty == 0 {
            return Err(LedgerError::InvalidQuantity(0));
        }
        if self.price <= Decimal::ZERO {
            return Err(LedgerError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

fn default_balance() -> Decimal {
    DEFAULT_ACCOUNT_BALANCE
}

/// Per-user ledger state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default = "default_balance")]
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub balance: Decimal,
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub positions: BTreeMap<String, u64>,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            balance: DEFAULT_ACCOUNT_BALANCE,
            trades: Vec::new(),
            positions: BTreeMap::new(),
        }
    }
}

impl Account {
    /// Quantity held for `symbol`, zero when the symbol was never traded.
    pub fn position(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// Applies a validated order. On rejection the account is left exactly as it was.
    pub(crate) fn execute(
        &mut self,
        order: &TradeOrder,
        timestamp: DateTime<Utc>,
    ) -> Result<Trade, LedgerError> {
        let trade = Trade::new(
            order.symbol.clone(),
            order.qty,
            order.price,
            order.side,
            timestamp,
        )?;
        let notional = trade.notional().ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "trade value {} x {} is too large",
                trade.qty, trade.price
            ))
        })?;
        let held = self.position(&trade.symbol);

        // Compute the new state first so a rejection leaves the account as it was
        let (balance, position) = match trade.side {
            TradeSide::Buy => {
                if self.balance < notional {
                    return Err(LedgerError::InsufficientBalance {
                        required: notional,
                        available: self.balance,
                    });
                }
                let position = held.checked_add(trade.qty).ok_or_else(|| {
                    LedgerError::PositionOverflow {
                        symbol: trade.symbol.clone(),
                        held,
                        requested: trade.qty,
                    }
                })?;
                (self.balance - notional, position)
            }
            TradeSide::Sell => {
                if held < trade.qty {
                    return Err(LedgerError::InsufficientShares {
                        symbol: trade.symbol.clone(),
                        requested: trade.qty,
                        held,
                    });
                }
                let balance = self.balance.checked_add(notional).ok_or_else(|| {
                    LedgerError::InvalidAmount(format!(
                        "selling for {} would overflow the balance {}",
                        notional, self.balance
                    ))
                })?;
                (balance, held - trade.qty)
            }
        };

        self.balance = balance;
        self.positions.insert(trade.symbol.clone(), position);

        self.trades.push(trade.clone());
        Ok(trade)
    }

    /// Adds `amount` (any sign) to the balance and returns the new balance.
    pub(crate) fn deposit(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount(
                "amount must not be zero".to_string(),
            ));
        }
        let new_balance = self.balance.checked_add(amount).ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "adding {} would overflow the balance {}",
                amount, self.balance
            ))
        })?;
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "withdrawing {} would leave a negative balance (available {})",
                amount.abs(),
                self.balance
            )));
        }
        self.balance = new_balance;
        Ok(new_balance)
    }

    /// Checks the invariants a persisted account must satisfy.
    pub fn validate(&self, user_id: &str) -> Result<(), LedgerError> {
        if self.balance < Decimal::ZERO {
            return Err(LedgerError::StoreCorrupted(format!(
                "account '{}' has a negative balance {}",
                user_id, self.balance
            )));
        }
        if self.positions.keys().any(|symbol| symbol.trim().is_empty()) {
            return Err(LedgerError::StoreCorrupted(format!(
                "account '{}' holds a position without a symbol",
                user_id
            )));
        }
        for (index, trade) in self.trades.iter().enumerate() {
            trade.validate().map_err(|e| {
                LedgerError::StoreCorrupted(format!(
                    "account '{}' trade #{} is invalid: {}",
                    user_id, index, e
                ))
            })?;
        }
        Ok(())
    }
}

/// Validates every account of a freshly loaded ledger.
pub fn validate_ledger(ledger: &Ledger) -> Result<(), LedgerError> {
    ledger
        .iter()
        .try_for_each(|(user_id, account)| account.validate(user_id))
}

/// Parses a serialized ledger document, treating any malformed content as corruption.
pub fn parse_ledger(raw: &[u8]) -> Result<Ledger, LedgerError> {
    let ledger: Ledger = serde_json::from_slice(raw)
        .map_err(|e| LedgerError::StoreCorrupted(format!("unparsable ledger document: {}", e)))?;
    validate_ledger(&ledger)?;
    Ok(ledger)
}

/// Input model for placing a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub symbol: String,
    pub qty: i64,
    pub price: Decimal,
    pub side: String,
}

impl NewTrade {
    pub fn new(symbol: impl Into<String>, qty: i64, price: Decimal, side: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            price,
            side: side.into(),
        }
    }

    /// Checks the preconditions of a trade and normalizes the symbol.
    pub(crate) fn validate(&self) -> Result<TradeOrder, LedgerError> {
        let symbol = normalize_symbol(&self.symbol)?;
        if self.qty <= 0 {
            return Err(LedgerError::InvalidQuantity(self.qty));
        }
        if self.price <= Decimal::ZERO {
            return Err(LedgerError::InvalidPrice(self.price));
        }
        let side = self.side.parse::<TradeSide>()?;
        Ok(TradeOrder {
            symbol,
            qty: self.qty as u64,
            price: self.price,
            side,
        })
    }
}

/// A trade request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TradeOrder {
    pub symbol: String,
    pub qty: u64,
    pub price: Decimal,
    pub side: TradeSide,
}

/// Result of an accepted trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcome {
    pub trade: Trade,
    pub balance: Decimal,
    pub positions: BTreeMap<String, u64>,
}

/// Trims and upper-cases a ticker symbol.
pub fn normalize_symbol(raw: &str) -> Result<String, LedgerError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(LedgerError::EmptySymbol);
    }
    Ok(symbol)
}

/// Formats a timestamp the way it is persisted and exported.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses an RFC 3339 instant, or a naive ISO-8601 date-time taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

mod iso_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

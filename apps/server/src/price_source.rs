//! Yahoo Finance price source used for portfolio valuation.

use std::time::Duration;

use async_trait::async_trait;
use papertrade_core::errors::{Error, Result};
use papertrade_core::market_data::PriceSourceTrait;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Latest daily close from Yahoo Finance.
///
/// Transient failures are retried up to `retries` more times with a linear
/// backoff; an unknown symbol fails immediately.
pub struct YahooPriceSource {
    connector: yahoo::YahooConnector,
    retries: u32,
}

impl YahooPriceSource {
    pub fn new(retries: u32) -> Result<Self> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            Error::PriceSource(format!("Failed to initialize Yahoo connector: {}", e))
        })?;
        Ok(Self { connector, retries })
    }

    async fn fetch_once(&self, symbol: &str) -> std::result::Result<Decimal, FetchError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| match e {
                yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
                    FetchError::NotFound
                }
                other => FetchError::Transient(other.to_string()),
            })?;
        let quote = response.last_quote().map_err(|_| FetchError::NotFound)?;
        Decimal::from_f64_retain(quote.close)
            .map(|close| close.round_dp(4))
            .ok_or_else(|| FetchError::Transient(format!("Unrepresentable close {}", quote.close)))
    }
}

enum FetchError {
    NotFound,
    Transient(String),
}

#[async_trait]
impl PriceSourceTrait for YahooPriceSource {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(symbol).await {
                Ok(price) => {
                    debug!("Fetched {} at {}", symbol, price);
                    return Ok(price);
                }
                Err(FetchError::NotFound) => {
                    return Err(Error::PriceSource(format!("No quote found for {}", symbol)));
                }
                Err(FetchError::Transient(message)) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Fetching {} failed ({}), retry {}/{}",
                        symbol, message, attempt, self.retries
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(FetchError::Transient(message)) => {
                    return Err(Error::PriceSource(format!(
                        "Fetching {} failed after {} attempts: {}",
                        symbol,
                        attempt + 1,
                        message
                    )));
                }
            }
        }
    }
}

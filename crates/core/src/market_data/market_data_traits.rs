use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;

/// Source of current market prices.
///
/// Implementations may fail transiently; callers treat a failed lookup as
/// "no price" for that symbol rather than failing the whole request.
#[async_trait]
pub trait PriceSourceTrait: Send + Sync {
    /// Latest price for `symbol`, failing with `Error::PriceSource` when none is available.
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal>;
}

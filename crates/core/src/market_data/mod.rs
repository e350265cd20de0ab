//! Market data module - the price lookup contract used for portfolio valuation.

mod market_data_traits;

pub use market_data_traits::PriceSourceTrait;

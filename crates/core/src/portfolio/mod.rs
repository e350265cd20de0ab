pub mod performance;
pub mod valuation;

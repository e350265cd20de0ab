//! Backtest module - buy-and-hold simulation over a price series.

mod backtest_model;
mod backtest_simulator;

pub use backtest_model::{BacktestRequest, BacktestResult};
pub use backtest_simulator::{backtest, run_backtest};

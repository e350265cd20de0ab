use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use papertrade_core::backtest::{run_backtest, BacktestRequest, BacktestResult};

use crate::{error::ApiResult, main_lib::AppState};

async fn backtest(
    payload: Result<Json<BacktestRequest>, JsonRejection>,
) -> ApiResult<Json<BacktestResult>> {
    let Json(request) = payload?;
    Ok(Json(run_backtest(&request)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/backtest", post(backtest))
}

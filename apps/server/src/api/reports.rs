use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use papertrade_core::ledger::Trade;
use papertrade_core::portfolio::performance::PerformanceSnapshot;
use papertrade_core::portfolio::valuation::PortfolioValuation;

use crate::{error::ApiResult, main_lib::AppState};

async fn get_history(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Trade>>> {
    Ok(Json(state.performance_service.get_history(&user_id)?))
}

async fn get_performance(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PerformanceSnapshot>> {
    Ok(Json(state.performance_service.get_performance(&user_id)?))
}

async fn get_valuation(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioValuation>> {
    Ok(Json(
        state.performance_service.get_valuation(&user_id).await?,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history/{user_id}", get(get_history))
        .route("/performance/{user_id}", get(get_performance))
        .route("/valuation/{user_id}", get(get_valuation))
}

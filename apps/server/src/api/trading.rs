use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use papertrade_core::ledger::{NewTrade, TradeOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeRequest {
    user_id: String,
    symbol: String,
    qty: i64,
    price: Decimal,
    side: String,
}

async fn place_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> ApiResult<Json<TradeOutcome>> {
    let Json(request) = payload?;
    let outcome = state
        .ledger_service
        .place_trade(
            &request.user_id,
            NewTrade::new(request.symbol, request.qty, request.price, request.side),
        )
        .await?;
    info!(
        "Trade executed for {}: {} {} x {}",
        request.user_id, outcome.trade.side, outcome.trade.symbol, outcome.trade.qty
    );
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddFundsRequest {
    user_id: String,
    amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFundsResponse {
    balance: Decimal,
}

async fn add_funds(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddFundsRequest>, JsonRejection>,
) -> ApiResult<Json<AddFundsResponse>> {
    let Json(request) = payload?;
    let balance = state
        .ledger_service
        .add_funds(&request.user_id, request.amount)
        .await?;
    info!("Funds added for {}: {}", request.user_id, request.amount);
    Ok(Json(AddFundsResponse { balance }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trade", post(place_trade))
        .route("/add-funds", post(add_funds))
}

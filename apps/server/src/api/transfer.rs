use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use papertrade_core::ledger::ImportSummary;
use tracing::info;

use crate::{error::ApiResult, main_lib::AppState};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

async fn import_positions(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ImportSummary>> {
    let summary = state
        .ledger_service
        .import_positions_csv(&user_id, &body)
        .await?;
    info!(
        "Imported {}/{} positions for {}",
        summary.imported, summary.total, user_id
    );
    Ok(Json(summary))
}

async fn import_history(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ImportSummary>> {
    let summary = state
        .ledger_service
        .import_trade_history_csv(&user_id, &body)
        .await?;
    info!(
        "Imported {}/{} trades for {}",
        summary.imported, summary.total, user_id
    );
    Ok(Json(summary))
}

async fn export_positions(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let csv = state.ledger_service.export_positions(&user_id)?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], csv))
}

async fn export_history(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let csv = state.ledger_service.export_trade_history(&user_id)?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], csv))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/import/positions/{user_id}", post(import_positions))
        .route("/import/history/{user_id}", post(import_history))
        .route("/export/positions/{user_id}", get(export_positions))
        .route("/export/history/{user_id}", get(export_history))
}

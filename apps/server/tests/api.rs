use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use papertrade_core::errors::{Error, Result};
use papertrade_core::market_data::PriceSourceTrait;
use papertrade_server::{
    api::app_router,
    build_state_with_price_source,
    config::{Config, StoreBackend},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

struct FixedPrices;

#[async_trait]
impl PriceSourceTrait for FixedPrices {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        match symbol {
            "AAPL" => Ok(dec!(200)),
            "MSFT" => Ok(dec!(400)),
            _ => Err(Error::PriceSource(format!("No quote found for {}", symbol))),
        }
    }
}

fn test_config(backend: StoreBackend, store_path: PathBuf) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        store_backend: backend,
        store_path,
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(5),
        price_retries: 0,
        log_format: "text".to_string(),
    }
}

async fn build_app(backend: StoreBackend, file_name: &str) -> (TempDir, Router) {
    let tmp = tempdir().unwrap();
    let config = test_config(backend, tmp.path().join(file_name));
    let state = build_state_with_price_source(&config, Arc::new(FixedPrices))
        .await
        .unwrap();
    (tmp, app_router(state, &config).unwrap())
}

async fn memory_app() -> (TempDir, Router) {
    build_app(StoreBackend::Memory, "unused.json").await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn trade(user: &str, symbol: &str, qty: i64, price: f64, side: &str) -> Value {
    json!({ "userId": user, "symbol": symbol, "qty": qty, "price": price, "side": side })
}

#[tokio::test]
async fn healthz_works() {
    let (_tmp, app) = memory_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn trade_then_read_performance_and_history() {
    let (_tmp, app) = memory_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u1", "aapl", 10, 150.5, "buy")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], json!(98495.0));
    assert_eq!(body["positions"]["AAPL"], json!(10));
    assert_eq!(body["trade"]["side"], json!("buy"));

    let (status, body) = send(&app, Method::GET, "/api/v1/papertrade/performance/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "balance": 98495.0, "positions": { "AAPL": 10 } }));

    let (status, body) = send(&app, Method::GET, "/api/v1/papertrade/history/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["symbol"], json!("AAPL"));
    assert!(body[0]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn rejected_trades_return_bad_request() {
    let (_tmp, app) = memory_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u2", "AAPL", 1, 10.0, "sell")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));
    assert!(body["message"].as_str().unwrap().contains("Insufficient shares"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u2", "AAPL", 1, 10.0, "short")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(json!({ "userId": "u2", "symbol": "AAPL", "qty": 1.5, "price": 10, "side": "buy" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/v1/papertrade/performance/u2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], json!(100000.0));
}

#[tokio::test]
async fn overflowing_trade_is_rejected_and_trading_continues() {
    let (_tmp, app) = memory_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u9", "AAPL", i64::MAX, 1e10, "buy")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u9", "AAPL", 1, 100.0, "buy")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], json!(99900.0));
}

#[tokio::test]
async fn add_funds_updates_balance() {
    let (_tmp, app) = memory_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/add-funds",
        Some(json!({ "userId": "u3", "amount": 2500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], json!(102500.0));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/add-funds",
        Some(json!({ "userId": "u3", "amount": -500000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_import_and_export() {
    let (_tmp, app) = memory_app().await;

    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/api/v1/papertrade/import/positions/u4",
        "symbol,qty\nMSFT,3\nBAD,-2\nAAPL,5\n",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let summary: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(summary["imported"], json!(2));
    assert_eq!(summary["skipped"], json!(1));
    assert_eq!(summary["errors"][0]["rowIndex"], json!(1));

    let (status, csv) = send_raw(
        &app,
        Method::GET,
        "/api/v1/papertrade/export/positions/u4",
        "",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(csv, "symbol,qty\nAAPL,5\nMSFT,3\n");

    let (status, _) = send_raw(
        &app,
        Method::POST,
        "/api/v1/papertrade/import/history/u4",
        "symbol,qty,price,side,timestamp\nAAPL,5,150,buy,2024-01-02T15:00:00Z\n",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, csv) = send_raw(&app, Method::GET, "/api/v1/papertrade/export/history/u4", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        csv,
        "symbol,qty,price,side,timestamp\nAAPL,5,150,buy,2024-01-02T15:00:00.000000Z\n"
    );

    let (status, _) = send_raw(&app, Method::POST, "/api/v1/papertrade/import/positions/u4", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn valuation_reports_profit_and_unpriced_symbols() {
    let (_tmp, app) = memory_app().await;
    for payload in [
        trade("u5", "AAPL", 10, 100.0, "buy"),
        trade("u5", "MSFT", 1, 500.0, "buy"),
        trade("u5", "ZZZZ", 2, 10.0, "buy"),
    ] {
        let (status, _) = send(&app, Method::POST, "/api/v1/papertrade/trade", Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, "/api/v1/papertrade/valuation/u5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holdings"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalInvested"], json!(1500.0));
    assert_eq!(body["totalCurrentValue"], json!(2400.0));
    assert_eq!(body["totalProfit"], json!(900.0));
    assert_eq!(body["profitPercent"], json!(60.0));
    assert_eq!(body["unpricedSymbols"], json!(["ZZZZ"]));
}

#[tokio::test]
async fn backtest_endpoint() {
    let (_tmp, app) = memory_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/backtest",
        Some(json!({ "prices": [100, 150], "initialBalance": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "initialBalance": 1000.0, "finalBalance": 1500.0, "profit": 500.0 })
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/backtest",
        Some(json!({ "prices": [100, 110] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profit"], json!(100000.0));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/backtest",
        Some(json!({ "prices": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn json_store_persists_across_restarts() {
    let tmp = tempdir().unwrap();
    let config = test_config(StoreBackend::Json, tmp.path().join("store.json"));

    let state = build_state_with_price_source(&config, Arc::new(FixedPrices))
        .await
        .unwrap();
    let app = app_router(state, &config).unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u6", "MSFT", 2, 300.0, "buy")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let state = build_state_with_price_source(&config, Arc::new(FixedPrices))
        .await
        .unwrap();
    let app = app_router(state, &config).unwrap();
    let (_, body) = send(&app, Method::GET, "/api/v1/papertrade/performance/u6", None).await;
    assert_eq!(body["balance"], json!(99400.0));
    assert_eq!(body["positions"]["MSFT"], json!(2));
}

#[tokio::test]
async fn sqlite_backend_serves_requests() {
    let (_tmp, app) = build_app(StoreBackend::Sqlite, "papertrading.db").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/papertrade/trade",
        Some(trade("u7", "AAPL", 1, 199.99, "buy")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/v1/papertrade/performance/u7", None).await;
    assert_eq!(body["balance"], json!(99800.01));
}

#[tokio::test]
async fn corrupted_store_fails_startup() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("store.json");
    std::fs::write(&path, "not json").unwrap();
    let config = test_config(StoreBackend::Json, path);

    let result = build_state_with_price_source(&config, Arc::new(FixedPrices)).await;
    assert!(result.is_err());
}

use std::sync::Arc;

use anyhow::Context;
use papertrade_core::{
    ledger::{InMemoryLedgerStore, LedgerService, LedgerServiceTrait, LedgerStoreTrait},
    market_data::PriceSourceTrait,
    portfolio::performance::{PerformanceService, PerformanceServiceTrait},
};
use papertrade_storage_json::JsonFileLedgerStore;
use papertrade_storage_sqlite::SqliteLedgerStore;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::price_source::YahooPriceSource;

pub struct AppState {
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub performance_service: Arc<dyn PerformanceServiceTrait>,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let price_source = YahooPriceSource::new(config.price_retries)?;
    build_state_with_price_source(config, Arc::new(price_source)).await
}

/// Builds the application state around the configured store and the given price source.
pub async fn build_state_with_price_source(
    config: &Config,
    price_source: Arc<dyn PriceSourceTrait>,
) -> anyhow::Result<Arc<AppState>> {
    let store = build_store(config)?;

    // Fail fast on a corrupted store rather than on the first request
    let ledger = store
        .load()
        .context("Ledger store could not be loaded")?;
    tracing::info!(
        "Ledger store ready ({:?} at {}), {} accounts",
        config.store_backend,
        config.store_path.display(),
        ledger.len()
    );

    let ledger_service = Arc::new(LedgerService::new(store.clone()));
    let performance_service = Arc::new(PerformanceService::new(store, price_source));

    Ok(Arc::new(AppState {
        ledger_service,
        performance_service,
    }))
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn LedgerStoreTrait>> {
    let store: Arc<dyn LedgerStoreTrait> = match config.store_backend {
        StoreBackend::Json => Arc::new(JsonFileLedgerStore::new(&config.store_path)),
        StoreBackend::Sqlite => {
            let db_path = config
                .store_path
                .to_str()
                .context("PT_STORE_PATH is not valid UTF-8")?;
            let pool = papertrade_storage_sqlite::open(db_path)?;
            Arc::new(SqliteLedgerStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory ledger store; nothing will be persisted");
            Arc::new(InMemoryLedgerStore::new())
        }
    };
    Ok(store)
}

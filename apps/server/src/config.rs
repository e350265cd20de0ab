use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};

/// Where the ledger is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
    Memory,
}

impl StoreBackend {
    fn default_path(&self) -> &'static str {
        match self {
            StoreBackend::Json | StoreBackend::Memory => "./data/papertrading_store.json",
            StoreBackend::Sqlite => "./data/papertrading.db",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!(
                "Invalid PT_STORE_BACKEND '{}': expected json, sqlite or memory",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub store_path: PathBuf,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub price_retries: u32,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("PT_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid PT_LISTEN_ADDR")?;
        let store_backend: StoreBackend = env_or("PT_STORE_BACKEND", "json").parse()?;
        let store_path = std::env::var("PT_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(store_backend.default_path()));
        let cors_allow = env_or("PT_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("PT_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid PT_REQUEST_TIMEOUT_MS")?;
        let price_retries: u32 = env_or("PT_PRICE_RETRIES", "2")
            .parse()
            .context("Invalid PT_PRICE_RETRIES")?;
        let log_format = env_or("PT_LOG_FORMAT", "text");

        Ok(Self {
            listen_addr,
            store_backend,
            store_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            price_retries,
            log_format,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("JSON".parse::<StoreBackend>().unwrap(), StoreBackend::Json);
        assert_eq!(" sqlite ".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_default_paths_follow_backend() {
        assert_eq!(
            StoreBackend::Json.default_path(),
            "./data/papertrading_store.json"
        );
        assert_eq!(StoreBackend::Sqlite.default_path(), "./data/papertrading.db");
    }
}

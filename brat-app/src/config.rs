//! Runtime configuration, read from the environment (and `.env`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::snapshot::{DEFAULT_WIDTH, MAX_WIDTH};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Font file to use instead of the system font lookup
    pub font_path: Option<PathBuf>,
    /// Directory shared images are dropped into; sharing is unsupported when absent
    pub share_dir: Option<PathBuf>,
    /// Default snapshot width in pixels
    pub snapshot_width: u32,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
    pub db_pool: DbPoolConfig,
}

/// Postgres connection pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Applies to both connecting and acquiring a pooled connection
    pub timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DbPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            font_path: None,
            share_dir: None,
            snapshot_width: DEFAULT_WIDTH,
            secure_cookies: false,
            db_pool: DbPoolConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Bad values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match non_empty("BRAT_BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid BRAT_BIND_ADDR '{}', using {}", raw, DEFAULT_BIND_ADDR);
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        let snapshot_width = match non_empty("BRAT_SNAPSHOT_WIDTH") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(w) if (1..=MAX_WIDTH).contains(&w) => w,
                _ => {
                    tracing::warn!("Invalid BRAT_SNAPSHOT_WIDTH '{}', using {}", raw, DEFAULT_WIDTH);
                    DEFAULT_WIDTH
                }
            },
            None => DEFAULT_WIDTH,
        };

        let secure_cookies = non_empty("BRAT_SECURE_COOKIES")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.secure_cookies);

        let pool_defaults = DbPoolConfig::default();
        let positive = |key: &str, default: u64| match non_empty(key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!("Invalid {} '{}', using {}", key, raw, default);
                    default
                }
            },
            None => default,
        };
        let max_connections = positive(
            "BRAT_DB_MAX_CONNECTIONS",
            pool_defaults.max_connections as u64,
        )
        .min(u32::MAX as u64) as u32;
        let db_pool = DbPoolConfig {
            max_connections,
            min_connections: pool_defaults.min_connections.min(max_connections),
            timeout: Duration::from_secs(positive(
                "BRAT_DB_TIMEOUT_SECS",
                pool_defaults.timeout.as_secs(),
            )),
            idle_timeout: pool_defaults.idle_timeout,
        };

        Self {
            bind_addr,
            database_url: non_empty("DATABASE_URL"),
            font_path: non_empty("BRAT_FONT_PATH").map(PathBuf::from),
            share_dir: non_empty("BRAT_SHARE_DIR").map(PathBuf::from),
            snapshot_width,
            secure_cookies,
            db_pool,
        }
    }
}

// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;
use url::Url;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when `DATABASE_URL` is unset or blank.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub host: String,
    pub port: u16,
    pub log_dir: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = lookup("PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let log_dir = lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string());

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(5);

        let db_acquire_timeout_secs = lookup("DB_ACQUIRE_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(3);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url,
            rust_log,
            host,
            port,
            log_dir,
            db_max_connections,
            db_acquire_timeout_secs,
            cors_origins,
        }
    }

    /// Listening address, falling back to all interfaces if `HOST` is not an IP.
    pub fn bind_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.port)))
    }

    /// Host part of the database URL, safe to log (no credentials).
    pub fn database_host(&self) -> Option<String> {
        let url = Url::parse(self.database_url.as_deref()?).ok()?;
        url.host_str().map(String::from)
    }
}

//! Application configuration loaded from environment variables.

use anyhow::Context;

/// Reads from environment variables:
/// - `DATABASE_URL` — Postgres connection string (required)
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8083`)
/// - `NATS_URL` — event bus address (optional; events are dropped without it)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub nats_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8083),
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            nats_url: std::env::var("NATS_URL").ok(),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

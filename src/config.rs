use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::external::{alphavantage, coingecko};
use crate::services::leaderboard_service::DEFAULT_LEADERBOARD_LIMIT;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// When unset the in-memory store is used.
    pub database_url: Option<String>,
    pub alpha_vantage_api_key: String,
    pub alpha_vantage_base_url: String,
    pub coingecko_base_url: String,
    pub price_lookup_timeout: Duration,
    pub leaderboard_limit: usize,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            alpha_vantage_api_key: "demo".to_string(),
            alpha_vantage_base_url: alphavantage::DEFAULT_BASE_URL.to_string(),
            coingecko_base_url: coingecko::DEFAULT_BASE_URL.to_string(),
            price_lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Outer bound the valuation engine puts on each lookup. It sits a little
    /// past the provider timeout so the provider side can record its failure first.
    pub fn valuation_timeout(&self) -> Duration {
        self.price_lookup_timeout + Duration::from_secs(1)
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parse_env("PORT", defaults.port),
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY")
                .unwrap_or(defaults.alpha_vantage_api_key),
            alpha_vantage_base_url: std::env::var("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or(defaults.alpha_vantage_base_url),
            coingecko_base_url: std::env::var("COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            price_lookup_timeout: Duration::from_secs(parse_env(
                "PRICE_LOOKUP_TIMEOUT_SECS",
                DEFAULT_LOOKUP_TIMEOUT_SECS,
            )),
            leaderboard_limit: parse_env("LEADERBOARD_LIMIT", defaults.leaderboard_limit),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or(defaults.cors_origins),
        }
    }
}

fn parse_env<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value {:?} for {}, using default {}", raw, key, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

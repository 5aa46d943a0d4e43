use async_trait::async_trait;
use thiserror::Error;

use crate::models::AssetType;

/// Why a single price could not be produced. The valuation engine treats
/// every variant the same way; the distinction only matters for logging
/// and for how long a failure is remembered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceLookupError {
    #[error("price not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Raw upstream failure as seen by a market-data client.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,
}

impl From<ProviderError> for PriceLookupError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::NotFound(_) | ProviderError::Rejected(_) => PriceLookupError::NotFound,
            ProviderError::RateLimited => PriceLookupError::RateLimited,
            other => PriceLookupError::Unavailable(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(value: reqwest::Error) -> Self {
        ProviderError::Network(value.to_string())
    }
}

/// Current unit price in USD for one asset.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn fetch_price(
        &self,
        asset_type: AssetType,
        symbol: &str,
    ) -> Result<f64, PriceLookupError>;
}

/// Keeps only finite, positive prices; anything else counts as "no price".
pub(crate) fn validated_price(price: Option<f64>) -> Result<f64, PriceLookupError> {
    match price {
        Some(p) if p.is_finite() && p > 0.0 => Ok(p),
        _ => Err(PriceLookupError::NotFound),
    }
}

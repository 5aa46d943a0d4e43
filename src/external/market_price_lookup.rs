use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::external::alphavantage::AlphaVantageClient;
use crate::external::coingecko::CoinGeckoClient;
use crate::external::price_lookup::{PriceLookup, PriceLookupError};
use crate::models::AssetType;
use crate::services::failure_cache::FailureCache;

/// Routes each lookup to the provider for its asset class:
/// crypto to CoinGecko, equities to Alpha Vantage.
///
/// Symbols that recently failed, including ones whose provider call ran
/// past `timeout`, are answered from the failure cache without another
/// upstream call until their TTL runs out.
pub struct MarketPriceLookup {
    coingecko: Arc<CoinGeckoClient>,
    alphavantage: Arc<AlphaVantageClient>,
    failure_cache: FailureCache,
    timeout: Duration,
}

impl MarketPriceLookup {
    pub fn new(
        coingecko: Arc<CoinGeckoClient>,
        alphavantage: Arc<AlphaVantageClient>,
        failure_cache: FailureCache,
        timeout: Duration,
    ) -> Self {
        Self { coingecko, alphavantage, failure_cache, timeout }
    }

    fn cache_key(asset_type: AssetType, symbol: &str) -> String {
        format!("{}:{}", asset_type, symbol)
    }
}

#[async_trait]
impl PriceLookup for MarketPriceLookup {
    async fn fetch_price(
        &self,
        asset_type: AssetType,
        symbol: &str,
    ) -> Result<f64, PriceLookupError> {
        let key = Self::cache_key(asset_type, symbol);
        if let Some(failure) = self.failure_cache.is_failed(&key) {
            debug!("Skipping lookup for {} - cached failure ({:?})", key, failure.error);
            return Err(failure.error);
        }

        let upstream = async {
            match asset_type {
                AssetType::Crypto => self.coingecko.current_price(symbol).await,
                AssetType::Equity => self.alphavantage.current_price(symbol).await,
            }
        };
        let result = tokio::time::timeout(self.timeout, upstream)
            .await
            .unwrap_or_else(|_| {
                Err(PriceLookupError::Unavailable(format!("timed out after {:?}", self.timeout)))
            });

        match &result {
            Ok(_) => self.failure_cache.clear(&key),
            Err(e) => {
                warn!("Price lookup failed for {}: {}", key, e);
                self.failure_cache.record_failure(&key, e.clone());
            }
        }
        result
    }
}

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::external::price_lookup::{validated_price, PriceLookupError, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Thin client over the public CoinGecko v3 API.
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
}

/// `[timestamp_ms, value]` pairs as returned by `market_chart`.
#[derive(Debug, Default, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
    #[serde(default)]
    pub total_volumes: Vec<[f64; 2]>,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::Parse(format!("invalid base URL {}: {}", base_url, e)))?;
        Ok(Self { client, base_url })
    }

    pub async fn top(&self, limit: u32) -> Result<Value, ProviderError> {
        let per_page = limit.to_string();
        self.get_json(
            &["coins", "markets"],
            &[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ],
        )
        .await
    }

    pub async fn search(&self, query: &str) -> Result<Value, ProviderError> {
        self.get_json(&["search"], &[("query", query)]).await
    }

    pub async fn history(&self, id: &str, days: u32) -> Result<Value, ProviderError> {
        let days = days.to_string();
        self.get_json(
            &["coins", id, "market_chart"],
            &[("vs_currency", "usd"), ("days", days.as_str())],
        )
        .await
    }

    pub async fn market_chart(&self, id: &str, days: u32) -> Result<MarketChart, ProviderError> {
        let body = self.history(id, days).await?;
        serde_json::from_value(body).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    pub async fn coin(&self, id: &str) -> Result<Value, ProviderError> {
        self.get_json(
            &["coins", id],
            &[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ],
        )
        .await
    }

    /// USD price from the coin detail's market data.
    pub async fn current_price(&self, id: &str) -> Result<f64, PriceLookupError> {
        let body = self.coin(id).await?;
        parse_usd_price(body)
    }

    /// Each segment is percent-encoded on its own, so an id can never
    /// reach a different endpoint.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Parse(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let url = self.endpoint(segments)?;
        let resp = self.client.get(url).query(query).send().await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(segments.join("/")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if !status.is_success() {
            return Err(error_message(&body)
                .map(ProviderError::Rejected)
                .unwrap_or(ProviderError::Status(status.as_u16())));
        }
        check_envelope(body)
    }
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(msg) => Some(msg.clone()),
        other => Some(other.to_string()),
    }
}

// CoinGecko occasionally answers 200 with an `error` field.
fn check_envelope(body: Value) -> Result<Value, ProviderError> {
    match error_message(&body) {
        Some(msg) => Err(ProviderError::Rejected(msg)),
        None => Ok(body),
    }
}

fn parse_usd_price(body: Value) -> Result<f64, PriceLookupError> {
    let coin: CoinResponse =
        serde_json::from_value(body).map_err(|e| PriceLookupError::Unavailable(e.to_string()))?;
    let price = coin
        .market_data
        .and_then(|m| m.current_price.get("usd").copied().flatten());
    validated_price(price)
}

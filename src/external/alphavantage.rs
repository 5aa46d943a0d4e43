use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::external::price_lookup::{validated_price, PriceLookupError, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AvGlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<AvGlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct AvGlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvBar {
    #[serde(rename = "4. close")]
    close: String,
}

/// Interval of a time series request. Daily bars are keyed `YYYY-MM-DD`,
/// intraday bars `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesInterval {
    Daily,
    FiveMinutes,
}

impl SeriesInterval {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(SeriesInterval::Daily),
            "5min" => Some(SeriesInterval::FiveMinutes),
            _ => None,
        }
    }

    fn series_key(&self) -> &'static str {
        match self {
            SeriesInterval::Daily => "Time Series (Daily)",
            SeriesInterval::FiveMinutes => "Time Series (5min)",
        }
    }
}

impl AlphaVantageClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn quote(&self, symbol: &str) -> Result<Value, ProviderError> {
        self.query(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)]).await
    }

    pub async fn intraday(&self, symbol: &str, interval: &str) -> Result<Value, ProviderError> {
        self.query(&[
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", interval),
        ])
        .await
    }

    pub async fn daily(&self, symbol: &str) -> Result<Value, ProviderError> {
        self.query(&[("function", "TIME_SERIES_DAILY"), ("symbol", symbol)]).await
    }

    pub async fn search(&self, keywords: &str) -> Result<Value, ProviderError> {
        self.query(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)]).await
    }

    /// Closing prices in ascending time order.
    pub async fn closes(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<Vec<(String, f64)>, ProviderError> {
        let body = match interval {
            SeriesInterval::Daily => self.daily(symbol).await?,
            SeriesInterval::FiveMinutes => self.intraday(symbol, "5min").await?,
        };
        parse_closes(body, interval)
    }

    pub async fn current_price(&self, symbol: &str) -> Result<f64, PriceLookupError> {
        let body = self.quote(symbol).await?;
        parse_quote_price(body)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        check_envelope(body)
    }
}

// Alpha Vantage always answers 200; failures live in the body:
// { "Error Message": "Invalid API call. ..." } for bad symbols and
// { "Note": "... 5 calls per minute ..." } (or "Information") when throttled.
fn check_envelope(body: Value) -> Result<Value, ProviderError> {
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        return Err(ProviderError::Rejected(msg.to_string()));
    }
    if body.get("Note").is_some() || body.get("Information").is_some() {
        return Err(ProviderError::RateLimited);
    }
    Ok(body)
}

fn parse_quote_price(body: Value) -> Result<f64, PriceLookupError> {
    let resp: AvGlobalQuoteResponse =
        serde_json::from_value(body).map_err(|e| PriceLookupError::Unavailable(e.to_string()))?;

    // Unknown symbols come back as an empty "Global Quote" object.
    let price = resp
        .quote
        .and_then(|q| q.price)
        .and_then(|p| p.trim().parse::<f64>().ok());
    validated_price(price)
}

fn parse_closes(body: Value, interval: SeriesInterval) -> Result<Vec<(String, f64)>, ProviderError> {
    let Some(series) = body.get(interval.series_key()) else {
        return Err(ProviderError::Parse(format!("missing {}", interval.series_key())));
    };

    // BTreeMap keeps the timestamp keys in ascending order.
    let bars: BTreeMap<String, AvBar> =
        serde_json::from_value(series.clone()).map_err(|e| ProviderError::Parse(e.to_string()))?;

    bars.into_iter()
        .map(|(time, bar)| {
            let close = bar
                .close
                .parse::<f64>()
                .map_err(|e| ProviderError::Parse(e.to_string()))?;
            Ok((time, close))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_means_rate_limited() {
        let body = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"});
        assert!(matches!(check_envelope(body), Err(ProviderError::RateLimited)));
    }

    #[test]
    fn test_error_message_is_rejected() {
        let body = json!({"Error Message": "Invalid API call."});
        assert!(matches!(check_envelope(body), Err(ProviderError::Rejected(_))));
    }

    #[test]
    fn test_parse_quote_price() {
        let body = json!({"Global Quote": {"01. symbol": "IBM", "05. price": "187.4200"}});
        assert_eq!(parse_quote_price(body), Ok(187.42));
    }

    #[test]
    fn test_empty_quote_is_not_found() {
        assert_eq!(parse_quote_price(json!({"Global Quote": {}})), Err(PriceLookupError::NotFound));
    }

    #[test]
    fn test_parse_closes_sorted_ascending() {
        let body = json!({
            "Meta Data": {},
            "Time Series (Daily)": {
                "2024-01-03": {"1. open": "1", "4. close": "103.0"},
                "2024-01-01": {"1. open": "1", "4. close": "101.0"},
                "2024-01-02": {"1. open": "1", "4. close": "102.0"}
            }
        });
        let closes = parse_closes(body, SeriesInterval::Daily).unwrap();
        let values: Vec<f64> = closes.iter().map(|(_, c)| *c).collect();
        assert_eq!(values, vec![101.0, 102.0, 103.0]);
        assert_eq!(closes[0].0, "2024-01-01");
    }
}

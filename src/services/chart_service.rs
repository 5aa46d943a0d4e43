use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::errors::AppError;
use crate::external::alphavantage::{AlphaVantageClient, SeriesInterval};
use crate::external::coingecko::CoinGeckoClient;
use crate::models::{ChartPoint, ChartSeries};

const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 30;

pub async fn crypto_chart(
    client: &CoinGeckoClient,
    id: &str,
    days: u32,
) -> Result<ChartSeries, AppError> {
    let chart = client.market_chart(id, days).await?;

    let prices = to_points(&chart.prices);
    let volumes = to_points(&chart.total_volumes);
    Ok(ChartSeries { volumes, ..with_averages(prices) })
}

pub async fn stock_chart(
    client: &AlphaVantageClient,
    symbol: &str,
    interval: SeriesInterval,
) -> Result<ChartSeries, AppError> {
    let closes = client.closes(symbol, interval).await?;

    let prices = closes
        .into_iter()
        .filter_map(|(time, close)| parse_series_time(&time).map(|time| ChartPoint { time, value: close }))
        .collect();
    Ok(with_averages(prices))
}

/// Attaches 7 and 30 period SMAs. A series shorter than a window yields an
/// empty average for it.
pub fn with_averages(prices: Vec<ChartPoint>) -> ChartSeries {
    let ma7 = moving_average(&prices, SHORT_WINDOW);
    let ma30 = moving_average(&prices, LONG_WINDOW);
    ChartSeries { prices, ma7, ma30, volumes: Vec::new() }
}

/// One point per full window, stamped with the time of the window's last price.
fn moving_average(prices: &[ChartPoint], window: usize) -> Vec<ChartPoint> {
    if window == 0 {
        return Vec::new();
    }
    prices
        .windows(window)
        .filter_map(|w| {
            let last = w.last()?;
            let sum: f64 = w.iter().map(|p| p.value).sum();
            Some(ChartPoint { time: last.time, value: sum / window as f64 })
        })
        .collect()
}

fn to_points(pairs: &[[f64; 2]]) -> Vec<ChartPoint> {
    pairs
        .iter()
        .filter_map(|[ms, value]| {
            Utc.timestamp_millis_opt(*ms as i64)
                .single()
                .map(|time| ChartPoint { time, value: *value })
        })
        .collect()
}

// Daily keys are dates, intraday keys carry a time of day.
fn parse_series_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

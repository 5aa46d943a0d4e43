use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::alphavantage::SeriesInterval;
use crate::external::price_lookup::ProviderError;
use crate::models::ChartSeries;
use crate::services::chart_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote/:symbol", get(get_quote))
        .route("/intraday/:symbol", get(get_intraday))
        .route("/daily/:symbol", get(get_daily))
        .route("/search/:keywords", get(search))
        .route("/chart/:symbol", get(get_chart))
}

#[derive(Debug, Deserialize)]
pub struct IntervalParams {
    interval: Option<String>,
}

fn log_failure(what: &str, symbol: &str, e: ProviderError) -> AppError {
    match &e {
        ProviderError::RateLimited => warn!("Rate limited fetching {} for {}", what, symbol),
        _ => error!("Failed to fetch {} for {}: {}", what, symbol, e),
    }
    AppError::from(e)
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/stock/quote/{}", symbol);
    let body = state
        .alphavantage
        .quote(&symbol)
        .await
        .map_err(|e| log_failure("quote", &symbol, e))?;
    Ok(Json(body))
}

pub async fn get_intraday(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<IntervalParams>,
) -> Result<Json<Value>, AppError> {
    let interval = params.interval.unwrap_or_else(|| "5min".to_string());
    info!("GET /api/stock/intraday/{} - interval {}", symbol, interval);
    let body = state
        .alphavantage
        .intraday(&symbol, &interval)
        .await
        .map_err(|e| log_failure("intraday series", &symbol, e))?;
    Ok(Json(body))
}

pub async fn get_daily(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/stock/daily/{}", symbol);
    let body = state
        .alphavantage
        .daily(&symbol)
        .await
        .map_err(|e| log_failure("daily series", &symbol, e))?;
    Ok(Json(body))
}

pub async fn search(
    State(state): State<AppState>,
    Path(keywords): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/stock/search/{}", keywords);
    let body = state
        .alphavantage
        .search(&keywords)
        .await
        .map_err(|e| log_failure("search results", &keywords, e))?;
    Ok(Json(body))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<IntervalParams>,
) -> Result<Json<ChartSeries>, AppError> {
    let raw = params.interval.unwrap_or_else(|| "daily".to_string());
    let interval = SeriesInterval::parse(&raw)
        .ok_or_else(|| AppError::Validation(format!("Unsupported interval: {}", raw)))?;
    let symbol = symbol.trim().to_uppercase();
    info!("GET /api/stock/chart/{} - interval {}", symbol, raw);

    let chart = chart_service::stock_chart(&state.alphavantage, &symbol, interval).await?;
    Ok(Json(chart))
}

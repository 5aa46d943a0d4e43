use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::ChartSeries;
use crate::services::chart_service;
use crate::state::AppState;

// Static segments are matched before `/:id`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/top", get(get_top))
        .route("/search/:query", get(search))
        .route("/:id/history", get(get_history))
        .route("/:id/chart", get(get_chart))
        .route("/:id", get(get_coin))
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct DaysParams {
    #[serde(default = "default_days")]
    days: u32,
}

fn default_limit() -> u32 {
    10
}

fn default_days() -> u32 {
    30
}

pub async fn get_top(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/crypto/top - limit {}", params.limit);
    let body = state.coingecko.top(params.limit).await.map_err(|e| {
        error!("Failed to fetch top cryptocurrencies: {}", e);
        AppError::from(e)
    })?;
    Ok(Json(body))
}

pub async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/crypto/search/{}", query);
    let body = state.coingecko.search(&query).await.map_err(|e| {
        error!("Failed to search cryptocurrencies for {}: {}", query, e);
        AppError::from(e)
    })?;
    Ok(Json(body))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DaysParams>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/crypto/{}/history - {} days", id, params.days);
    let body = state.coingecko.history(&id, params.days).await.map_err(|e| {
        error!("Failed to fetch history for {}: {}", id, e);
        AppError::from(e)
    })?;
    Ok(Json(body))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DaysParams>,
) -> Result<Json<ChartSeries>, AppError> {
    info!("GET /api/crypto/{}/chart - {} days", id, params.days);
    let chart = chart_service::crypto_chart(&state.coingecko, &id, params.days)
        .await
        .map_err(|e| {
            error!("Failed to build chart for {}: {}", id, e);
            e
        })?;
    Ok(Json(chart))
}

pub async fn get_coin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("GET /api/crypto/{}", id);
    let body = state.coingecko.coin(&id).await.map_err(|e| {
        error!("Failed to fetch data for {}: {}", id, e);
        AppError::from(e)
    })?;
    Ok(Json(body))
}

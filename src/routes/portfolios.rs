use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use axum::routing::{get, post};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, error};

use crate::errors::AppError;
use crate::models::{
    CreatePortfolio, LeaderboardEntry, Portfolio, PortfolioValuation, UpdatePortfolio,
    UpsertLeaderboardEntry,
};
use crate::services::{leaderboard_service, portfolio_service, valuation_service};
use crate::state::AppState;

// `/leaderboard/...` and `/user/...` are static prefixes, so they win over `/:id`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_portfolio))
        .route("/user/:user_id", get(fetch_user_portfolios))
        .route("/leaderboard/all", get(get_leaderboard))
        .route("/leaderboard", post(update_leaderboard))
        .route("/:id/valuation", get(get_valuation))
        .route("/:id", get(get_portfolio).put(update_portfolio).delete(delete_portfolio))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationParams {
    #[serde(default)]
    publish: bool,
    user_name: Option<String>,
}

#[axum::debug_handler]
pub async fn create_portfolio(
    State(state): State<AppState>,
    Json(data): Json<CreatePortfolio>
) -> Result<Json<Portfolio>, AppError> {
    info!("POST /api/portfolio - Creating portfolio for user {}", data.user_id);
    let portfolio = portfolio_service::create(state.store.as_ref(), data).await
        .map_err(|e| {
            error!("Failed to create portfolio: {}", e);
            e
        })?;
    Ok(Json(portfolio))
}

pub async fn fetch_user_portfolios(
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> Result<Json<Vec<Portfolio>>, AppError> {
    info!("GET /api/portfolio/user/{} - Fetching portfolios", user_id);
    let portfolios = portfolio_service::fetch_for_user(state.store.as_ref(), &user_id).await
        .map_err(|e| {
            error!("Failed to fetch portfolios for user {}: {}", user_id, e);
            e
        })?;
    Ok(Json(portfolios))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Portfolio>, AppError> {
    info!("GET /api/portfolio/{} - Fetching portfolio", id);
    let portfolio = portfolio_service::fetch_one(state.store.as_ref(), &id).await?;
    Ok(Json(portfolio))
}

pub async fn update_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdatePortfolio>
) -> Result<Json<Portfolio>, AppError> {
    info!("PUT /api/portfolio/{} - Updating portfolio", id);
    let portfolio = portfolio_service::update(state.store.as_ref(), &id, data).await
        .map_err(|e| {
            error!("Failed to update portfolio {}: {}", id, e);
            e
        })?;
    Ok(Json(portfolio))
}

pub async fn delete_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Value>, AppError> {
    info!("DELETE /api/portfolio/{} - Deleting portfolio", id);
    portfolio_service::delete(state.store.as_ref(), &id).await
        .map_err(|e| {
            error!("Failed to delete portfolio {}: {}", id, e);
            e
        })?;
    Ok(Json(json!({ "message": "Portfolio deleted" })))
}

/// Values the portfolio against live prices. With `publish=true` the total is
/// also pushed to the leaderboard, which skips zero totals.
pub async fn get_valuation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ValuationParams>
) -> Result<Json<PortfolioValuation>, AppError> {
    info!("GET /api/portfolio/{}/valuation - Valuing portfolio", id);
    let portfolio = portfolio_service::fetch_one(state.store.as_ref(), &id).await?;

    let valuation = valuation_service::value_portfolio(
        &portfolio,
        state.price_lookup.as_ref(),
        state.price_lookup_timeout,
    ).await;

    if params.publish {
        leaderboard_service::upsert_entry(
            state.store.as_ref(),
            UpsertLeaderboardEntry {
                user_id: portfolio.user_id.clone(),
                user_name: params.user_name,
                portfolio_id: portfolio.id.clone(),
                total_value: valuation.total,
            },
        ).await?;
    }

    Ok(Json(valuation))
}

pub async fn get_leaderboard(
    State(state): State<AppState>
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    info!("GET /api/portfolio/leaderboard/all - Fetching leaderboard");
    let entries = leaderboard_service::get_leaderboard(
        state.store.as_ref(),
        state.leaderboard_limit,
    ).await?;
    Ok(Json(entries))
}

pub async fn update_leaderboard(
    State(state): State<AppState>,
    Json(data): Json<UpsertLeaderboardEntry>
) -> Result<Response, AppError> {
    info!("POST /api/portfolio/leaderboard - Updating entry for {}/{}", data.user_id, data.portfolio_id);
    match leaderboard_service::upsert_entry(state.store.as_ref(), data).await? {
        Some(entry) => Ok(Json(entry).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

//! Drives the HTTP surface in-process against the in-memory store and a
//! stub price lookup. No network or database is touched.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use market_tracker::app::create_app;
use market_tracker::external::alphavantage::AlphaVantageClient;
use market_tracker::external::coingecko::CoinGeckoClient;
use market_tracker::external::price_lookup::{PriceLookup, PriceLookupError};
use market_tracker::models::AssetType;
use market_tracker::state::AppState;
use market_tracker::store::MemoryStore;

struct FixedPrices(HashMap<&'static str, f64>);

#[async_trait]
impl PriceLookup for FixedPrices {
    async fn fetch_price(&self, _asset_type: AssetType, symbol: &str) -> Result<f64, PriceLookupError> {
        self.0.get(symbol).copied().ok_or(PriceLookupError::NotFound)
    }
}

fn test_app() -> Router {
    let prices = FixedPrices(HashMap::from([("bitcoin", 30000.0), ("AAPL", 200.0)]));
    let timeout = Duration::from_secs(2);
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        price_lookup: Arc::new(prices),
        // never contacted by these tests
        coingecko: Arc::new(CoinGeckoClient::new("http://127.0.0.1:9", timeout).unwrap()),
        alphavantage: Arc::new(AlphaVantageClient::new("http://127.0.0.1:9", "demo", timeout).unwrap()),
        price_lookup_timeout: timeout,
        leaderboard_limit: 100,
    };
    create_app(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_portfolio_lifecycle() {
    let app = test_app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/portfolio",
        Some(json!({ "userId": "user_1", "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "My Portfolio");
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("user_1_"));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/portfolio/{}", id),
        Some(json!({
            "holdings": [
                { "type": "crypto", "symbol": "Bitcoin", "quantity": 2, "purchasePrice": 20000 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["holdings"][0]["symbol"], "bitcoin");

    let (status, listed) = send(&app, Method::GET, "/api/portfolio/user/user_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/portfolio/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &format!("/api/portfolio/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Portfolio not found");
}

#[tokio::test]
async fn test_invalid_quantity_is_rejected() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/portfolio",
        Some(json!({
            "userId": "user_2",
            "holdings": [{ "type": "equity", "symbol": "AAPL", "quantity": 0, "purchasePrice": 100 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("greater than 0"));
}

#[tokio::test]
async fn test_valuation_publishes_to_leaderboard() {
    let app = test_app();

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/portfolio",
        Some(json!({
            "userId": "user_3",
            "name": "Mixed",
            "holdings": [
                { "type": "crypto", "symbol": "bitcoin", "quantity": 2, "purchasePrice": 20000 },
                { "type": "equity", "symbol": "nvda", "quantity": 10, "purchasePrice": 50 }
            ]
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, valuation) = send(
        &app,
        Method::GET,
        &format!("/api/portfolio/{}/valuation?publish=true&userName=Trader", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // bitcoin priced live, NVDA unknown to the stub so valued at purchase price
    assert_eq!(valuation["total"], 60000.0 + 500.0);
    assert_eq!(valuation["totalGainLoss"], 20000.0);
    assert_eq!(valuation["holdings"][1]["currentPrice"], 50.0);
    assert_eq!(valuation["holdings"][1]["gainLossPercent"], 0.0);

    let (status, board) = send(&app, Method::GET, "/api/portfolio/leaderboard/all", None).await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["id"], format!("user_3_{}", id));
    assert_eq!(board[0]["userName"], "Trader");
    assert_eq!(board[0]["totalValue"], 60500.0);
}

#[tokio::test]
async fn test_leaderboard_entry_survives_portfolio_delete() {
    let app = test_app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/portfolio",
        Some(json!({
            "userId": "user_5",
            "holdings": [{ "type": "crypto", "symbol": "bitcoin", "quantity": 1, "purchasePrice": 10000 }]
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::GET, &format!("/api/portfolio/{}/valuation?publish=true", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/portfolio/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/portfolio/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, board) = send(&app, Method::GET, "/api/portfolio/leaderboard/all", None).await;
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["id"], format!("user_5_{}", id));
    assert_eq!(board[0]["portfolioId"], id.as_str());
    assert_eq!(board[0]["totalValue"], 30000.0);
}

#[tokio::test]
async fn test_stock_type_is_stored_as_equity() {
    let app = test_app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/portfolio",
        Some(json!({
            "userId": "user_6",
            "holdings": [{ "type": "stock", "symbol": "aapl", "quantity": 1, "purchasePrice": 150 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["holdings"][0]["type"], "equity");
    assert_eq!(created["holdings"][0]["symbol"], "AAPL");
}

#[tokio::test]
async fn test_empty_portfolio_valuation_is_not_published() {
    let app = test_app();
    let (_, created) = send(&app, Method::POST, "/api/portfolio", Some(json!({ "userId": "user_4" }))).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, valuation) = send(
        &app,
        Method::GET,
        &format!("/api/portfolio/{}/valuation?publish=true", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(valuation["total"], 0.0);
    assert_eq!(valuation["totalGainLossPercent"], 0.0);
    assert!(valuation["holdings"].as_array().unwrap().is_empty());

    let (_, board) = send(&app, Method::GET, "/api/portfolio/leaderboard/all", None).await;
    assert!(board.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_leaderboard_upserts_and_ranks() {
    let app = test_app();

    for (portfolio, value) in [("p1", 50.0), ("p2", 200.0), ("p3", 75.0)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/portfolio/leaderboard",
            Some(json!({ "userId": "u", "portfolioId": portfolio, "totalValue": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/portfolio/leaderboard",
        Some(json!({ "userId": "u", "portfolioId": "p1", "totalValue": 300.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["userName"], "User u");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/portfolio/leaderboard",
        Some(json!({ "userId": "u", "portfolioId": "p9", "totalValue": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, board) = send(&app, Method::GET, "/api/portfolio/leaderboard/all", None).await;
    let values: Vec<f64> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["totalValue"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![300.0, 200.0, 75.0]);
}

#[tokio::test]
async fn test_unknown_portfolio_valuation_is_not_found() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/api/portfolio/missing_1/valuation", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::models::{CreatePortfolio, Holding, Portfolio, UpdatePortfolio};
use crate::store::PortfolioStore;

// Ids are `{userId}_{millis}`; a taken id moves the millis forward.
const MAX_ID_ATTEMPTS: i64 = 1000;

// Provider ids and tickers: `usd-coin`, `BRK.B`, `TSCO.LON`.
fn is_valid_symbol(symbol: &str) -> bool {
    symbol.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && symbol.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Rejects holdings the valuation engine must never see and stores symbols
/// in their canonical case.
pub fn validate_holdings(holdings: Vec<Holding>) -> Result<Vec<Holding>, AppError> {
    holdings
        .into_iter()
        .map(|mut h| {
            let symbol = h.canonical_symbol();
            if symbol.is_empty() {
                return Err(AppError::Validation("Holding symbol cannot be empty".into()));
            }
            if !is_valid_symbol(&symbol) {
                return Err(AppError::Validation(format!("Invalid holding symbol: {}", symbol)));
            }
            if !h.quantity.is_finite() || h.quantity <= 0.0 {
                return Err(AppError::Validation(format!(
                    "Quantity for {} must be greater than 0",
                    symbol
                )));
            }
            if !h.purchase_price.is_finite() || h.purchase_price < 0.0 {
                return Err(AppError::Validation(format!(
                    "Purchase price for {} cannot be negative",
                    symbol
                )));
            }
            h.symbol = symbol;
            Ok(h)
        })
        .collect()
}

pub async fn create(
    store: &dyn PortfolioStore,
    input: CreatePortfolio,
) -> Result<Portfolio, AppError> {
    let user_id = input.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId is required".into()));
    }
    let holdings = validate_holdings(input.holdings.unwrap_or_default())?;

    let mut portfolio = Portfolio::new(user_id, input.name, holdings);
    let created_millis = portfolio.created_at.timestamp_millis();
    let mut attempt = 0;
    while !store.insert_portfolio(&portfolio).await? {
        attempt += 1;
        if attempt >= MAX_ID_ATTEMPTS {
            return Err(AppError::Conflict(format!(
                "Could not allocate a portfolio id for user {}",
                portfolio.user_id
            )));
        }
        portfolio.id = Portfolio::id_for(&portfolio.user_id, created_millis + attempt);
    }
    info!("Created portfolio {} for user {}", portfolio.id, portfolio.user_id);
    Ok(portfolio)
}

pub async fn fetch_one(store: &dyn PortfolioStore, id: &str) -> Result<Portfolio, AppError> {
    store
        .get_portfolio(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))
}

pub async fn fetch_for_user(
    store: &dyn PortfolioStore,
    user_id: &str,
) -> Result<Vec<Portfolio>, AppError> {
    let portfolios = store.list_user_portfolios(user_id).await?;
    Ok(portfolios)
}

/// Renames (when a non-empty name is given) and replaces the whole holdings
/// list (when one is given). There is no partial holding patch.
pub async fn update(
    store: &dyn PortfolioStore,
    id: &str,
    input: UpdatePortfolio,
) -> Result<Portfolio, AppError> {
    let mut portfolio = fetch_one(store, id).await?;

    if let Some(name) = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        portfolio.name = name;
    }
    if let Some(holdings) = input.holdings {
        portfolio.holdings = validate_holdings(holdings)?;
    }
    portfolio.updated_at = Utc::now();

    store.save_portfolio(&portfolio).await?;
    Ok(portfolio)
}

/// Leaderboard entries for the portfolio are left untouched.
pub async fn delete(store: &dyn PortfolioStore, id: &str) -> Result<(), AppError> {
    if store.delete_portfolio(id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Portfolio not found".to_string()))
    }
}

use chrono::Utc;
use tracing::{debug, error};

use crate::errors::AppError;
use crate::models::{LeaderboardEntry, UpsertLeaderboardEntry};
use crate::store::PortfolioStore;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 100;

/// Records the latest total for a (user, portfolio) pair.
///
/// Returns `Ok(None)` without touching the store unless `total_value` is
/// strictly positive, so empty portfolios never appear on the board.
/// Otherwise the entry with id `{user_id}_{portfolio_id}` is replaced
/// wholesale (or inserted) with a fresh `updated_at`.
pub async fn upsert_entry(
    store: &dyn PortfolioStore,
    input: UpsertLeaderboardEntry,
) -> Result<Option<LeaderboardEntry>, AppError> {
    if input.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".into()));
    }
    if input.portfolio_id.trim().is_empty() {
        return Err(AppError::Validation("portfolioId is required".into()));
    }
    if !input.total_value.is_finite() {
        return Err(AppError::Validation("totalValue must be a finite number".into()));
    }
    if input.total_value <= 0.0 {
        debug!(
            "Skipping leaderboard update for {}/{}: total value is {}",
            input.user_id, input.portfolio_id, input.total_value
        );
        return Ok(None);
    }

    let user_name = input
        .user_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("User {}", input.user_id));

    let entry = LeaderboardEntry {
        id: LeaderboardEntry::entry_id(&input.user_id, &input.portfolio_id),
        user_id: input.user_id,
        user_name,
        portfolio_id: input.portfolio_id,
        total_value: input.total_value,
        updated_at: Utc::now(),
    };

    store.upsert_leaderboard_entry(&entry).await.map_err(|e| {
        error!("Failed to upsert leaderboard entry {}: {}", entry.id, e);
        AppError::from(e)
    })?;
    Ok(Some(entry))
}

/// Ranked entries, highest total first, capped at `limit`. An empty board is
/// an empty list.
pub async fn get_leaderboard(
    store: &dyn PortfolioStore,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let entries = store.list_leaderboard(limit).await.map_err(|e| {
        error!("Failed to read leaderboard: {}", e);
        AppError::from(e)
    })?;
    Ok(entries)
}

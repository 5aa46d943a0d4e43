use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LeaderboardEntry, Portfolio};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Document store with two collections, `portfolios` and `leaderboard`,
/// both keyed by opaque string ids. Every write replaces a whole document;
/// concurrent writers to the same id race and the last one wins.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn get_portfolio(&self, id: &str) -> Result<Option<Portfolio>, StoreError>;

    /// A user's portfolios, oldest first.
    async fn list_user_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>, StoreError>;

    async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), StoreError>;

    /// Stores a new portfolio only if its id is free. Returns false, and
    /// writes nothing, when the id is already taken.
    async fn insert_portfolio(&self, portfolio: &Portfolio) -> Result<bool, StoreError>;

    /// Returns false when no portfolio had that id.
    async fn delete_portfolio(&self, id: &str) -> Result<bool, StoreError>;

    /// Insert or wholesale replace the entry with the same id. A replaced
    /// entry keeps its original insertion position for tie-breaking.
    async fn upsert_leaderboard_entry(&self, entry: &LeaderboardEntry) -> Result<(), StoreError>;

    /// Entries by `total_value` descending, ties in insertion order,
    /// at most `limit` of them.
    async fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

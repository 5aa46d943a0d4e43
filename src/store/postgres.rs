use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{PortfolioStore, StoreError};
use crate::models::{LeaderboardEntry, Portfolio};

/// Durable store: each collection is a table of JSONB documents keyed by id.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies the bundled migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PortfolioStore for PgStore {
    async fn get_portfolio(&self, id: &str) -> Result<Option<Portfolio>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Portfolio>,)>(
            "SELECT document FROM portfolios WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(Json(p),)| p))
    }

    async fn list_user_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>, StoreError> {
        let rows = sqlx::query_as::<_, (Json<Portfolio>,)>(
            "SELECT document FROM portfolios
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(Json(p),)| p).collect())
    }

    async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO portfolios (id, user_id, document, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE
             SET user_id = EXCLUDED.user_id,
                 document = EXCLUDED.document,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&portfolio.id)
        .bind(&portfolio.user_id)
        .bind(Json(portfolio))
        .bind(portfolio.created_at)
        .bind(portfolio.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_portfolio(&self, portfolio: &Portfolio) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO portfolios (id, user_id, document, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&portfolio.id)
        .bind(&portfolio.user_id)
        .bind(Json(portfolio))
        .bind(portfolio.created_at)
        .bind(portfolio.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_portfolio(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_leaderboard_entry(&self, entry: &LeaderboardEntry) -> Result<(), StoreError> {
        // seq is only assigned on first insert, so a replaced entry keeps its tie position
        sqlx::query(
            "INSERT INTO leaderboard (id, total_value, document, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE
             SET total_value = EXCLUDED.total_value,
                 document = EXCLUDED.document,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&entry.id)
        .bind(entry.total_value)
        .bind(Json(entry))
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, (Json<LeaderboardEntry>,)>(
            "SELECT document FROM leaderboard
             ORDER BY total_value DESC, seq ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(Json(e),)| e).collect())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's portfolio total, ranked against everyone else's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub portfolio_id: String,
    pub total_value: f64,
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Uniqueness key: at most one entry per (user, portfolio) pair.
    pub fn entry_id(user_id: &str, portfolio_id: &str) -> String {
        format!("{}_{}", user_id, portfolio_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLeaderboardEntry {
    pub user_id: String,
    pub user_name: Option<String>,
    pub portfolio_id: String,
    pub total_value: f64,
}

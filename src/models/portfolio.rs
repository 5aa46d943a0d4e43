use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Holding;

pub const DEFAULT_PORTFOLIO_NAME: &str = "My Portfolio";

// A named collection of holdings owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolio {
    pub user_id: String,
    pub name: Option<String>,
    pub holdings: Option<Vec<Holding>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolio {
    pub name: Option<String>,
    pub holdings: Option<Vec<Holding>>,
}

impl Portfolio {
    /// The id is `{user_id}_{creation millis}` and never changes afterwards.
    pub(crate) fn new(user_id: String, name: Option<String>, holdings: Vec<Holding>) -> Self {
        let now = Utc::now();
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_NAME.to_string());
        Self {
            id: Self::id_for(&user_id, now.timestamp_millis()),
            user_id,
            name,
            holdings,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn id_for(user_id: &str, millis: i64) -> String {
        format!("{}_{}", user_id, millis)
    }
}

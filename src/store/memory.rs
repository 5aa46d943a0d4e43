use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::{PortfolioStore, StoreError};
use crate::models::{LeaderboardEntry, Portfolio};

/// Process-scoped store used when no database is configured.
/// Same semantics as the database store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    portfolios: DashMap<String, Portfolio>,
    // Kept in insertion order so ranking ties stay stable.
    leaderboard: RwLock<Vec<LeaderboardEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn get_portfolio(&self, id: &str) -> Result<Option<Portfolio>, StoreError> {
        Ok(self.portfolios.get(id).map(|p| p.value().clone()))
    }

    async fn list_user_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>, StoreError> {
        let mut portfolios: Vec<Portfolio> = self
            .portfolios
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.value().clone())
            .collect();
        portfolios.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(portfolios)
    }

    async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), StoreError> {
        self.portfolios.insert(portfolio.id.clone(), portfolio.clone());
        Ok(())
    }

    async fn insert_portfolio(&self, portfolio: &Portfolio) -> Result<bool, StoreError> {
        match self.portfolios.entry(portfolio.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(portfolio.clone());
                Ok(true)
            },
        }
    }

    async fn delete_portfolio(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.portfolios.remove(id).is_some())
    }

    async fn upsert_leaderboard_entry(&self, entry: &LeaderboardEntry) -> Result<(), StoreError> {
        let mut entries = self.leaderboard.write();
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }
        Ok(())
    }

    async fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = self.leaderboard.read().clone();
        // sort_by is stable, so equal totals keep insertion order
        entries.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
        entries.truncate(limit);
        Ok(entries)
    }
}

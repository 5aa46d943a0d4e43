pub mod chart_service;
pub mod failure_cache;
pub mod leaderboard_service;
pub mod portfolio_service;
pub mod valuation_service;

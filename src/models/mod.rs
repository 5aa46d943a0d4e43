mod holding;
mod portfolio;
mod valuation;
mod leaderboard;
mod chart;

pub use holding::{AssetType, Holding};
pub use portfolio::{CreatePortfolio, Portfolio, UpdatePortfolio, DEFAULT_PORTFOLIO_NAME};
pub use valuation::{gain_loss_percent, PortfolioValuation, ValuedHolding};
pub use leaderboard::{LeaderboardEntry, UpsertLeaderboardEntry};
pub use chart::{ChartPoint, ChartSeries};

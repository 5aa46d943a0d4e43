use std::sync::Arc;
use std::time::Duration;

use crate::external::alphavantage::AlphaVantageClient;
use crate::external::coingecko::CoinGeckoClient;
use crate::external::price_lookup::PriceLookup;
use crate::store::PortfolioStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortfolioStore>,
    pub price_lookup: Arc<dyn PriceLookup>,
    pub coingecko: Arc<CoinGeckoClient>,
    pub alphavantage: Arc<AlphaVantageClient>,
    pub price_lookup_timeout: Duration,
    pub leaderboard_limit: usize,
}

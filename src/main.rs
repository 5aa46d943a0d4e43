use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use market_tracker::app;
use market_tracker::config::AppConfig;
use market_tracker::external::alphavantage::AlphaVantageClient;
use market_tracker::external::coingecko::CoinGeckoClient;
use market_tracker::external::market_price_lookup::MarketPriceLookup;
use market_tracker::logging::{self, LoggingConfig};
use market_tracker::services::failure_cache::FailureCache;
use market_tracker::state::AppState;
use market_tracker::store::{MemoryStore, PgStore, PortfolioStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env();

    let store: Arc<dyn PortfolioStore> = match &config.database_url {
        Some(url) => {
            info!("Using Postgres store");
            Arc::new(PgStore::connect(url).await?)
        },
        None => {
            warn!("DATABASE_URL not set. Using in-memory storage; data is lost on restart.");
            Arc::new(MemoryStore::new())
        },
    };

    let coingecko = Arc::new(CoinGeckoClient::new(
        &config.coingecko_base_url,
        config.price_lookup_timeout,
    )?);
    let alphavantage = Arc::new(AlphaVantageClient::new(
        &config.alpha_vantage_base_url,
        &config.alpha_vantage_api_key,
        config.price_lookup_timeout,
    )?);
    if config.alpha_vantage_api_key == "demo" {
        warn!("ALPHA_VANTAGE_API_KEY not set, using the demo key");
    }

    let price_lookup = Arc::new(MarketPriceLookup::new(
        coingecko.clone(),
        alphavantage.clone(),
        FailureCache::new(),
        config.price_lookup_timeout,
    ));

    let state = AppState {
        store,
        price_lookup,
        coingecko,
        alphavantage,
        price_lookup_timeout: config.valuation_timeout(),
        leaderboard_limit: config.leaderboard_limit,
    };
    let app = app::create_app(state).layer(app::cors_layer(&config.cors_origins));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("Market tracker backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

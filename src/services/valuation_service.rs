use std::time::Duration;

use futures::future::join_all;
use tracing::warn;

use crate::external::price_lookup::{PriceLookup, PriceLookupError};
use crate::models::{Holding, Portfolio, PortfolioValuation, ValuedHolding};

/// Values every holding of `portfolio` against live prices.
///
/// Lookups are issued concurrently, one per holding, and each one is bounded
/// by `lookup_timeout`. A failed or timed-out lookup only affects its own
/// holding, which is then valued at its purchase price. The result is always
/// produced; an empty portfolio values to all zeros.
pub async fn value_portfolio(
    portfolio: &Portfolio,
    prices: &dyn PriceLookup,
    lookup_timeout: Duration,
) -> PortfolioValuation {
    value_holdings(&portfolio.holdings, prices, lookup_timeout).await
}

pub async fn value_holdings(
    holdings: &[Holding],
    prices: &dyn PriceLookup,
    lookup_timeout: Duration,
) -> PortfolioValuation {
    let valued = join_all(
        holdings
            .iter()
            .map(|holding| value_holding(holding, prices, lookup_timeout)),
    )
    .await;

    PortfolioValuation::from_holdings(valued)
}

async fn value_holding(
    holding: &Holding,
    prices: &dyn PriceLookup,
    lookup_timeout: Duration,
) -> ValuedHolding {
    match lookup_price(holding, prices, lookup_timeout).await {
        Ok(price) => ValuedHolding::priced(holding, price),
        Err(e) => {
            warn!(
                "Using purchase price for {} {}: {}",
                holding.asset_type, holding.symbol, e
            );
            ValuedHolding::at_purchase_price(holding)
        }
    }
}

async fn lookup_price(
    holding: &Holding,
    prices: &dyn PriceLookup,
    lookup_timeout: Duration,
) -> Result<f64, PriceLookupError> {
    let symbol = holding.canonical_symbol();
    tokio::time::timeout(lookup_timeout, prices.fetch_price(holding.asset_type, &symbol))
        .await
        .map_err(|_| PriceLookupError::Unavailable(format!("timed out after {:?}", lookup_timeout)))?
}

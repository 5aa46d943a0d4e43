pub mod alphavantage;
pub mod coingecko;
pub mod market_price_lookup;
pub mod price_lookup;

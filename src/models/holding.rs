use serde::{Deserialize, Serialize};

/// Asset class of a holding; decides which market-data provider prices it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Crypto,
    #[serde(alias = "stock")]
    Equity,
}

impl AssetType {
    /// Canonical case for lookups: crypto ids are lower-case, tickers upper-case.
    pub fn normalize_symbol(&self, symbol: &str) -> String {
        let trimmed = symbol.trim();
        match self {
            AssetType::Crypto => trimmed.to_lowercase(),
            AssetType::Equity => trimmed.to_uppercase(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Crypto => "crypto",
            AssetType::Equity => "equity",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// One recorded position within a portfolio. Prices are USD per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub symbol: String,
    pub quantity: f64,
    #[serde(default)]
    pub purchase_price: f64,
}

impl Holding {
    pub fn new(asset_type: AssetType, symbol: &str, quantity: f64, purchase_price: f64) -> Self {
        Self {
            asset_type,
            symbol: symbol.to_string(),
            quantity,
            purchase_price,
        }
    }

    pub fn canonical_symbol(&self) -> String {
        self.asset_type.normalize_symbol(&self.symbol)
    }

    pub fn purchase_value(&self) -> f64 {
        self.purchase_price * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_case_follows_asset_type() {
        assert_eq!(AssetType::Crypto.normalize_symbol(" BitCoin "), "bitcoin");
        assert_eq!(AssetType::Equity.normalize_symbol("aapl"), "AAPL");
    }

    #[test]
    fn test_holding_uses_wire_field_names() {
        let json = r#"{"type":"crypto","symbol":"bitcoin","quantity":2,"purchasePrice":20000}"#;
        let holding: Holding = serde_json::from_str(json).unwrap();
        assert_eq!(holding.asset_type, AssetType::Crypto);
        assert_eq!(holding.purchase_value(), 40000.0);

        let value = serde_json::to_value(&holding).unwrap();
        assert_eq!(value["type"], "crypto");
        assert_eq!(value["purchasePrice"], 20000.0);
    }

    #[test]
    fn test_stock_is_accepted_as_equity() {
        let holding: Holding =
            serde_json::from_str(r#"{"type":"stock","symbol":"MSFT","quantity":1,"purchasePrice":300}"#).unwrap();
        assert_eq!(holding.asset_type, AssetType::Equity);
    }
}

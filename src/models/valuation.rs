use serde::{Deserialize, Serialize};

use super::{AssetType, Holding};

/// Percentage change of `gain` relative to `base`; 0 when there is no base.
pub fn gain_loss_percent(gain: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        gain / base * 100.0
    }
}

// A holding priced against the current market. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuedHolding {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub purchase_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
}

impl ValuedHolding {
    pub fn priced(holding: &Holding, current_price: f64) -> Self {
        let current_value = current_price * holding.quantity;
        let purchase_value = holding.purchase_value();
        let gain_loss = current_value - purchase_value;
        Self {
            asset_type: holding.asset_type,
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            purchase_price: holding.purchase_price,
            current_price,
            current_value,
            purchase_value,
            gain_loss,
            gain_loss_percent: gain_loss_percent(gain_loss, purchase_value),
        }
    }

    /// Fallback pricing: the purchase price stands in for the market price.
    pub fn at_purchase_price(holding: &Holding) -> Self {
        Self::priced(holding, holding.purchase_price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub total: f64,
    pub total_purchase: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub holdings: Vec<ValuedHolding>,
}

impl PortfolioValuation {
    pub fn from_holdings(holdings: Vec<ValuedHolding>) -> Self {
        let total = holdings.iter().fold(0.0, |acc, h| acc + h.current_value);
        let total_purchase = holdings.iter().fold(0.0, |acc, h| acc + h.purchase_value);
        let total_gain_loss = total - total_purchase;
        Self {
            total,
            total_purchase,
            total_gain_loss,
            total_gain_loss_percent: gain_loss_percent(total_gain_loss, total_purchase),
            holdings,
        }
    }
}

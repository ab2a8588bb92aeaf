use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Sport;

/// Trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Hold,
    Sell,
}

impl Signal {
    /// Fixed confidence attached to each signal
    pub fn confidence(&self) -> f64 {
        match self {
            Signal::Buy => 0.80,
            Signal::Hold => 0.65,
            Signal::Sell => 0.70,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The card being analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub player: String,
    pub year: i32,
    pub manufacturer: String,
    pub sport: Sport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub entry_price: Decimal,
    pub target_sell_price: Decimal,
    pub stop_loss: Decimal,
    pub average_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReward {
    pub ratio: String,
    pub assessment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub signal: Signal,
    pub confidence: f64,
    pub price_targets: PriceTargets,
    pub risk_reward: RiskReward,
    pub reasoning: String,
    pub action_items: Vec<String>,
}

/// Which inputs were substituted or thin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub player_score_estimated: bool,
    pub price_estimated: bool,
}

/// Strategy Agent output. Exactly one of `strategy` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub context_id: String,
    pub card: CardInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<DataQuality>,
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StrategyReport {
    pub fn is_error(&self) -> bool {
        self.strategy.is_none()
    }
}

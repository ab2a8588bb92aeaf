use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CardInfo, MarketReport, PlayerReport, PriceTargets, RiskReward, Signal, StrategyReport};

/// Headline recommendation pulled out of the strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub signal: Signal,
    pub confidence: f64,
    pub price_targets: PriceTargets,
    pub risk_reward: RiskReward,
}

/// Raw sub-results behind a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub market: MarketReport,
    pub player: PlayerReport,
    pub strategy: StrategyReport,
}

/// How the entry price compares with the caller's budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAssessment {
    pub budget: Decimal,
    pub entry_price: Decimal,
    pub within_budget: bool,
    /// Copies affordable at the entry price
    pub max_units: u64,
}

impl BudgetAssessment {
    pub fn new(budget: Decimal, entry_price: Decimal) -> Self {
        let max_units = if entry_price > Decimal::ZERO && budget > Decimal::ZERO {
            (budget / entry_price).floor().to_u64().unwrap_or(0)
        } else {
            0
        };

        Self {
            budget,
            entry_price,
            within_budget: entry_price > Decimal::ZERO && entry_price <= budget,
            max_units,
        }
    }
}

/// Consolidated result returned to the presentation layer.
///
/// `success == false` means `error` (and usually `suggestion`) are set and
/// the recommendation fields are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAnalysis {
    pub success: bool,
    pub supervisor: String,
    pub timestamp: DateTime<Utc>,
    pub context_id: String,
    pub card: CardInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<DetailedAnalysis>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub action_items: Vec<String>,
    /// Recommendation rests on simulated or estimated inputs
    #[serde(default)]
    pub uses_estimated_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Row handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub card: CardInfo,
    pub market: MarketReport,
    pub player: PlayerReport,
    pub strategy: StrategyReport,
    pub analysis_type: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_budget_assessment() {
        let fit = BudgetAssessment::new(dec!(1000), dec!(475.00));
        assert!(fit.within_budget);
        assert_eq!(fit.max_units, 2);

        let over = BudgetAssessment::new(dec!(100), dec!(475.00));
        assert!(!over.within_budget);
        assert_eq!(over.max_units, 0);

        let zero = BudgetAssessment::new(dec!(100), Decimal::ZERO);
        assert!(!zero.within_budget);
        assert_eq!(zero.max_units, 0);
    }
}

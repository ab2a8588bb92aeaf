use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_price;

/// Marketplace search request. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keywords: String,
    pub max_results: u32,
    pub sold_only: bool,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl SearchQuery {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            max_results: 10,
            sold_only: false,
            min_price: None,
            max_price: None,
        }
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, 100);
        self
    }

    pub fn sold_only(mut self, sold_only: bool) -> Self {
        self.sold_only = sold_only;
        self
    }

    pub fn price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }
}

/// Builds normalized keyword strings for card searches
#[derive(Debug, Clone, Default)]
pub struct CardKeywords {
    player: String,
    year: Option<i32>,
    manufacturer: Option<String>,
    rookie: bool,
    auto: bool,
    graded: bool,
    psa_grade: Option<u8>,
}

impl CardKeywords {
    pub fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
            ..Default::default()
        }
    }

    /// "{player} {year} {manufacturer}", the cache key used by market research
    pub fn for_card(player: &str, year: i32, manufacturer: &str) -> String {
        Self::new(player)
            .year(year)
            .manufacturer(manufacturer)
            .build()
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn manufacturer(mut self, manufacturer: &str) -> Self {
        self.manufacturer = Some(manufacturer.to_string());
        self
    }

    pub fn rookie(mut self) -> Self {
        self.rookie = true;
        self
    }

    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn graded(mut self, psa_grade: Option<u8>) -> Self {
        self.graded = true;
        self.psa_grade = psa_grade;
        self
    }

    pub fn build(&self) -> String {
        let mut parts = vec![self.player.clone()];
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        if let Some(manufacturer) = &self.manufacturer {
            parts.push(manufacturer.clone());
        }
        if self.rookie {
            parts.push("rookie".to_string());
        }
        if self.auto {
            parts.push("auto".to_string());
        }
        if self.graded {
            match self.psa_grade {
                Some(grade) => parts.push(format!("PSA {}", grade)),
                None => parts.push("graded".to_string()),
            }
        }

        parts
            .iter()
            .flat_map(|p| p.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One observed listing returned by the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub item_id: String,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub sold: bool,
    pub condition: String,
    pub url: String,
}

/// Liquidity tier derived from the number of sold listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Liquidity {
    #[serde(rename = "Baja")]
    Low,
    #[serde(rename = "Media")]
    Medium,
    #[serde(rename = "Alta")]
    High,
    /// Used only when market data could not be fetched
    #[serde(rename = "Desconocida")]
    Unknown,
}

impl Liquidity {
    pub fn from_count(count: usize) -> Self {
        if count >= 10 {
            Liquidity::High
        } else if count >= 5 {
            Liquidity::Medium
        } else {
            Liquidity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Liquidity::Low => "Baja",
            Liquidity::Medium => "Media",
            Liquidity::High => "Alta",
            Liquidity::Unknown => "Desconocida",
        }
    }
}

impl std::fmt::Display for Liquidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Price statistics over the sold listings for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub sold_count: usize,
    pub average_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub liquidity: Liquidity,
    pub price_spread_pct: Decimal,
    pub insight: String,
}

impl MarketSnapshot {
    /// Statistics over the sold records; active listings are ignored.
    /// Returns `None` when nothing sold.
    pub fn from_sales(records: &[SaleRecord]) -> Option<Self> {
        let prices: Vec<Decimal> = records.iter().filter(|r| r.sold).map(|r| r.price).collect();
        if prices.is_empty() {
            return None;
        }

        let count = prices.len();
        let sum: Decimal = prices.iter().copied().sum();
        let avg = sum / Decimal::from(count as u64);
        let min = prices.iter().copied().min().unwrap_or(Decimal::ZERO);
        let max = prices.iter().copied().max().unwrap_or(Decimal::ZERO);

        let spread = if avg > Decimal::ZERO {
            (max - min) / avg * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        Some(Self {
            sold_count: count,
            average_price: round_price(avg),
            min_price: round_price(min),
            max_price: round_price(max),
            liquidity: Liquidity::from_count(count),
            price_spread_pct: round_price(spread),
            insight: String::new(),
        })
    }

    /// A market with no recorded sales. Valid data, not an error.
    pub fn empty(insight: impl Into<String>) -> Self {
        Self {
            sold_count: 0,
            average_price: Decimal::ZERO,
            min_price: Decimal::ZERO,
            max_price: Decimal::ZERO,
            liquidity: Liquidity::Low,
            price_spread_pct: Decimal::ZERO,
            insight: insight.into(),
        }
    }

    /// Placeholder used when the marketplace could not be read
    pub fn unavailable(error: &str) -> Self {
        Self {
            liquidity: Liquidity::Unknown,
            ..Self::empty(format!("Error al obtener datos: {}", error))
        }
    }
}

/// Market Research Agent output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub agent: String,
    pub card: String,
    pub timestamp: DateTime<Utc>,
    pub context_id: String,
    pub from_cache: bool,
    /// Set when the snapshot is a fallback after an upstream failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub market_analysis: MarketSnapshot,
}

impl MarketReport {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

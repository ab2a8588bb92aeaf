//! Analysis agents
//!
//! Market research and player analysis gather data through capability
//! traits; the strategy agent is pure; the supervisor composes them.

pub mod market_research;
pub mod player_analysis;
pub mod scoring;
pub mod strategy;
pub mod supervisor;
pub mod traits;

pub use market_research::{CacheStats, MarketResearchAgent};
pub use player_analysis::PlayerAnalysisAgent;
pub use scoring::{score_player, FootballRole};
pub use strategy::{StrategyAgent, ThresholdUpdate};
pub use supervisor::Supervisor;
pub use traits::{AnalysisStore, NewsProvider, SearchProvider, SentimentAnalyzer, StatsProvider};

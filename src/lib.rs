pub mod adapters;
pub mod agents;
pub mod cache;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;

pub use agents::{
    MarketResearchAgent, PlayerAnalysisAgent, StrategyAgent, Supervisor, ThresholdUpdate,
};
pub use cache::TtlCache;
pub use config::AppConfig;
pub use coordination::{CircuitBreaker, CircuitBreakerStats, CircuitState};
pub use domain::{CardInfo, InvestmentAnalysis, Signal, Sport};
pub use error::{CardError, Result};

//! Capability traits for the collaborators the agents depend on
//!
//! Agents hold these as `Arc<dyn Trait>` so production adapters and test
//! fakes are interchangeable.

use async_trait::async_trait;

use crate::domain::{
    AnalysisRecord, NewsFeed, NewsItem, SaleRecord, SearchQuery, SentimentReport, Sport,
    StatsLookup,
};
use crate::error::{Result, SearchError};

/// Marketplace keyword search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search. Rate limiting must surface as [`SearchError::RateLimited`].
    async fn search(
        &self,
        query: &SearchQuery,
    ) -> std::result::Result<Vec<SaleRecord>, SearchError>;
}

/// Per-sport season statistics
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn player_stats(&self, name: &str, sport: Sport) -> StatsLookup;
}

/// Recent headlines about a player
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn player_news(&self, name: &str, sport: Sport) -> Result<NewsFeed>;
}

/// Scores a batch of headlines
#[cfg_attr(test, mockall::automock)]
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, items: &[NewsItem]) -> SentimentReport;
}

/// Storage for completed analyses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<()>;
}

pub mod ebay;
pub mod news;
pub mod postgres;
pub mod sentiment;
pub mod stats;

pub use ebay::EbayClient;
pub use news::{GoogleNewsClient, SimulatedNewsProvider};
pub use postgres::PostgresStore;
pub use sentiment::KeywordSentimentAnalyzer;
pub use stats::SimulatedStatsProvider;

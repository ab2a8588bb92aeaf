//! Player Analysis Agent
//!
//! Turns sport statistics and an optional performance note into a 0-100
//! score. News and sentiment are gathered alongside; their failure only
//! sets `news_error` on the report.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::{NewsFeed, PerformanceScore, PlayerReport, Sport, StatsLookup};
use crate::error::{CardError, Result};

use super::scoring::score_player;
use super::traits::{NewsProvider, SentimentAnalyzer, StatsProvider};

pub const AGENT_NAME: &str = "Player Analysis Agent";

pub struct PlayerAnalysisAgent {
    stats: Arc<dyn StatsProvider>,
    news: Arc<dyn NewsProvider>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    stats_timeout: Duration,
    news_timeout: Duration,
}

impl PlayerAnalysisAgent {
    pub fn new(
        stats: Arc<dyn StatsProvider>,
        news: Arc<dyn NewsProvider>,
        sentiment: Arc<dyn SentimentAnalyzer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            stats,
            news,
            sentiment,
            stats_timeout: config.stats.request_timeout(),
            news_timeout: Duration::from_secs(config.news.request_timeout_secs),
        }
    }

    #[instrument(skip(self, performance_note), fields(context_id = tracing::field::Empty))]
    pub async fn analyze(
        &self,
        player: &str,
        sport: Sport,
        performance_note: Option<&str>,
    ) -> Result<PlayerReport> {
        if player.trim().is_empty() {
            return Err(CardError::Validation("player name is required".to_string()));
        }

        let context_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("context_id", context_id.as_str());

        let (lookup, news) = tokio::join!(
            self.lookup_stats(player, sport),
            self.fetch_news(player, sport)
        );

        let score = score_player(&lookup, performance_note);
        let (stats, simulated, stats_error) = match lookup {
            StatsLookup::Found { stats, simulated } => (Some(stats), simulated, None),
            StatsLookup::NotFound { error } => {
                warn!(
                    player,
                    sport = %sport,
                    error = %error,
                    "Stats unavailable, using fallback score"
                );
                (None, false, Some(error))
            }
        };

        let (news, sentiment, news_error) = match news {
            Ok(feed) => {
                let sentiment =
                    (!feed.items.is_empty()).then(|| self.sentiment.analyze(&feed.items));
                (Some(feed), sentiment, None)
            }
            Err(e) => {
                warn!(player, error = %e, "News lookup failed");
                (None, None, Some(e.to_string()))
            }
        };

        info!(
            player,
            sport = %sport,
            score = score.overall_score,
            trend = %score.trend,
            simulated,
            "Player analysis complete"
        );

        Ok(PlayerReport {
            agent: AGENT_NAME.to_string(),
            player: player.to_string(),
            sport,
            timestamp: Utc::now(),
            context_id,
            future_outlook: outlook(&score, simulated),
            performance_score: score,
            simulated,
            stats,
            stats_error,
            news,
            sentiment,
            news_error,
        })
    }

    async fn lookup_stats(&self, player: &str, sport: Sport) -> StatsLookup {
        let request = self.stats.player_stats(player, sport);
        match tokio::time::timeout(self.stats_timeout, request).await {
            Ok(lookup) => lookup,
            Err(_) => StatsLookup::NotFound {
                error: format!(
                    "Stats request timed out after {}s",
                    self.stats_timeout.as_secs()
                ),
            },
        }
    }

    async fn fetch_news(&self, player: &str, sport: Sport) -> Result<NewsFeed> {
        match tokio::time::timeout(self.news_timeout, self.news.player_news(player, sport)).await {
            Ok(result) => result,
            Err(_) => Err(CardError::Internal(format!(
                "News request timed out after {}s",
                self.news_timeout.as_secs()
            ))),
        }
    }
}

fn outlook(score: &PerformanceScore, simulated: bool) -> String {
    let mut text = format!(
        "Jugador con rendimiento {} ({}/100), tendencia {}",
        score.rating.label().to_lowercase(),
        score.overall_score,
        score.trend
    );
    if simulated {
        text.push_str(" (simulated data)");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::traits::{MockNewsProvider, MockSentimentAnalyzer, MockStatsProvider};
    use crate::domain::{
        NewsItem, Rating, Sentiment, SentimentDistribution, SentimentReport, SportStats, Trend,
    };

    fn lebron_stats(simulated: bool) -> StatsLookup {
        StatsLookup::Found {
            stats: SportStats::Basketball {
                games_played: 45,
                points_per_game: 27.1,
                assists_per_game: 8.3,
                rebounds_per_game: 7.4,
                field_goal_pct: 0.54,
            },
            simulated,
        }
    }

    fn one_headline() -> NewsFeed {
        NewsFeed {
            items: vec![NewsItem {
                title: "LeBron James wins again".into(),
                url: "https://news.example/1".into(),
                published: "Mon, 06 Jan 2025 10:00:00 GMT".into(),
                source: "Example".into(),
            }],
            simulated: false,
        }
    }

    fn positive_sentiment() -> SentimentReport {
        SentimentReport {
            overall_sentiment: Sentiment::Positive,
            sentiment_score: 0.5,
            confidence: 1.0,
            distribution: SentimentDistribution {
                positive: 1,
                neutral: 0,
                negative: 0,
            },
            recommendation: "positive".into(),
        }
    }

    fn agent(
        stats: MockStatsProvider,
        news: MockNewsProvider,
        sentiment: MockSentimentAnalyzer,
    ) -> PlayerAnalysisAgent {
        PlayerAnalysisAgent::new(
            Arc::new(stats),
            Arc::new(news),
            Arc::new(sentiment),
            &AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_scores_real_stats_with_news() {
        let mut stats = MockStatsProvider::new();
        stats.expect_player_stats().returning(|_, _| lebron_stats(false));
        let mut news = MockNewsProvider::new();
        news.expect_player_news().returning(|_, _| Ok(one_headline()));
        let mut sentiment = MockSentimentAnalyzer::new();
        sentiment.expect_analyze().times(1).returning(|_| positive_sentiment());

        let report = agent(stats, news, sentiment)
            .analyze("LeBron James", Sport::NBA, None)
            .await
            .unwrap();

        // 50 + 20 (ppg) + 10 (apg) + 5 (rpg)
        assert_eq!(report.performance_score.overall_score, 85);
        assert_eq!(report.performance_score.rating, Rating::Elite);
        assert_eq!(report.performance_score.trend, Trend::Stable);
        assert!(!report.simulated);
        assert!(!report.is_estimated());
        assert!(!report.future_outlook.contains("simulated"));
        assert_eq!(
            report.sentiment.map(|s| s.overall_sentiment),
            Some(Sentiment::Positive)
        );
        assert!(report.news_error.is_none());
    }

    #[tokio::test]
    async fn test_simulated_stats_are_flagged() {
        let mut stats = MockStatsProvider::new();
        stats.expect_player_stats().returning(|_, _| lebron_stats(true));
        let mut news = MockNewsProvider::new();
        news.expect_player_news().returning(|_, _| {
            Ok(NewsFeed {
                items: vec![],
                simulated: true,
            })
        });
        let mut sentiment = MockSentimentAnalyzer::new();
        sentiment.expect_analyze().never();

        let report = agent(stats, news, sentiment)
            .analyze("LeBron James", Sport::NBA, None)
            .await
            .unwrap();

        assert!(report.simulated);
        assert!(report.is_estimated());
        assert!(report.future_outlook.ends_with("(simulated data)"));
        assert!(report.sentiment.is_none());
    }

    #[tokio::test]
    async fn test_news_failure_is_scoped() {
        let mut stats = MockStatsProvider::new();
        stats.expect_player_stats().returning(|_, _| lebron_stats(false));
        let mut news = MockNewsProvider::new();
        news.expect_player_news()
            .returning(|_, _| Err(CardError::Internal("feed down".into())));

        let report = agent(stats, news, MockSentimentAnalyzer::new())
            .analyze("LeBron James", Sport::NBA, Some("injured ankle"))
            .await
            .unwrap();

        assert_eq!(report.performance_score.overall_score, 70);
        assert_eq!(report.performance_score.trend, Trend::Declining);
        assert!(report.news.is_none());
        assert!(report.news_error.unwrap().contains("feed down"));
    }

    #[tokio::test]
    async fn test_missing_stats_fall_back_to_generic_score() {
        let mut stats = MockStatsProvider::new();
        stats.expect_player_stats().returning(|_, _| StatsLookup::NotFound {
            error: "Player not found".into(),
        });
        let mut news = MockNewsProvider::new();
        news.expect_player_news().returning(|_, _| Ok(one_headline()));
        let mut sentiment = MockSentimentAnalyzer::new();
        sentiment.expect_analyze().returning(|_| positive_sentiment());

        let report = agent(stats, news, sentiment)
            .analyze("Nobody Known", Sport::MLB, None)
            .await
            .unwrap();

        assert_eq!(report.performance_score.overall_score, 75);
        assert!(report.stats.is_none());
        assert_eq!(report.stats_error.as_deref(), Some("Player not found"));
        assert!(report.is_estimated());
    }

    struct StalledStats;

    #[async_trait::async_trait]
    impl StatsProvider for StalledStats {
        async fn player_stats(&self, _name: &str, _sport: Sport) -> StatsLookup {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_stats_use_configured_timeout() {
        let mut config = AppConfig::default();
        config.stats.request_timeout_secs = 5;
        config.marketplace.request_timeout_secs = 30;
        let mut news = MockNewsProvider::new();
        news.expect_player_news().returning(|_, _| Ok(one_headline()));
        let mut sentiment = MockSentimentAnalyzer::new();
        sentiment.expect_analyze().returning(|_| positive_sentiment());
        let agent = PlayerAnalysisAgent::new(
            Arc::new(StalledStats),
            Arc::new(news),
            Arc::new(sentiment),
            &config,
        );

        let started = tokio::time::Instant::now();
        let report = agent.analyze("LeBron James", Sport::NBA, None).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(30), "took {:?}", elapsed);
        assert_eq!(report.performance_score.overall_score, 75);
        assert_eq!(
            report.stats_error.as_deref(),
            Some("Stats request timed out after 5s")
        );
    }

    #[test]
    fn test_outlook_template() {
        let score = PerformanceScore::new(78, Trend::Improving);
        assert_eq!(
            outlook(&score, true),
            "Jugador con rendimiento excellent (78/100), tendencia Improving (simulated data)"
        );
    }
}

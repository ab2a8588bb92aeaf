use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported sports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    NBA,
    NHL,
    MLB,
    NFL,
    Soccer,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::NBA => "NBA",
            Sport::NHL => "NHL",
            Sport::MLB => "MLB",
            Sport::NFL => "NFL",
            Sport::Soccer => "Soccer",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NBA" | "BASKETBALL" => Ok(Sport::NBA),
            "NHL" | "HOCKEY" => Ok(Sport::NHL),
            "MLB" | "BASEBALL" => Ok(Sport::MLB),
            "NFL" | "FOOTBALL" => Ok(Sport::NFL),
            "SOCCER" | "FUTBOL" | "FÚTBOL" => Ok(Sport::Soccer),
            other => Err(format!("unsupported sport: {}", other)),
        }
    }
}

/// Season statistics, one variant per sport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SportStats {
    Basketball {
        games_played: u32,
        points_per_game: f64,
        assists_per_game: f64,
        rebounds_per_game: f64,
        field_goal_pct: f64,
    },
    Hockey {
        games_played: u32,
        goals: u32,
        assists: u32,
        points: u32,
        points_per_game: f64,
        plus_minus: i32,
    },
    Baseball {
        games_played: u32,
        batting_avg: f64,
        home_runs: u32,
        rbi: u32,
        hits: u32,
    },
    Football {
        passing_yards: u32,
        passing_touchdowns: u32,
        interceptions: u32,
        rushing_yards: u32,
        rushing_touchdowns: u32,
        receptions: u32,
        receiving_yards: u32,
        receiving_touchdowns: u32,
    },
    Soccer {
        matches_played: u32,
        minutes_played: u32,
        goals: u32,
        assists: u32,
        shots: u32,
        shots_on_target: u32,
        yellow_cards: u32,
        red_cards: u32,
    },
}

/// Result of asking a stats provider about a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsLookup {
    /// Stats were produced; `simulated` marks synthesized values
    Found { stats: SportStats, simulated: bool },
    NotFound { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Improving => write!(f, "Improving"),
            Trend::Stable => write!(f, "Stable"),
            Trend::Declining => write!(f, "Declining"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Elite,
    Excellent,
    Good,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

impl Rating {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Rating::Elite,
            75..=84 => Rating::Excellent,
            65..=74 => Rating::Good,
            50..=64 => Rating::Average,
            _ => Rating::BelowAverage,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Elite => "Elite",
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Average => "Average",
            Rating::BelowAverage => "Below Average",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Player evaluation on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceScore {
    pub overall_score: u8,
    pub trend: Trend,
    pub rating: Rating,
}

impl PerformanceScore {
    /// Clamps `raw` into 0..=100 and derives the rating band
    pub fn new(raw: i32, trend: Trend) -> Self {
        let overall_score = raw.clamp(0, 100) as u8;
        Self {
            overall_score,
            trend,
            rating: Rating::from_score(overall_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub published: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFeed {
    pub items: Vec<NewsItem>,
    /// Headlines were synthesized because the real feed was unreachable
    pub simulated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn classify(score: f64) -> Self {
        if score >= 0.05 {
            Sentiment::Positive
        } else if score <= -0.05 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub overall_sentiment: Sentiment,
    pub sentiment_score: f64,
    pub confidence: f64,
    pub distribution: SentimentDistribution,
    pub recommendation: String,
}

/// Player Analysis Agent output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub agent: String,
    pub player: String,
    pub sport: Sport,
    pub timestamp: DateTime<Utc>,
    pub context_id: String,
    pub performance_score: PerformanceScore,
    /// True when the score rests on synthesized stats
    pub simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SportStats>,
    /// Why stats were unavailable, when they were
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_error: Option<String>,
    pub future_outlook: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<NewsFeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentReport>,
    /// Failure of the news/sentiment lookup only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_error: Option<String>,
}

impl PlayerReport {
    /// Score did not come from real stats
    pub fn is_estimated(&self) -> bool {
        self.simulated || self.stats.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bands() {
        assert_eq!(Rating::from_score(100), Rating::Elite);
        assert_eq!(Rating::from_score(85), Rating::Elite);
        assert_eq!(Rating::from_score(84), Rating::Excellent);
        assert_eq!(Rating::from_score(75), Rating::Excellent);
        assert_eq!(Rating::from_score(65), Rating::Good);
        assert_eq!(Rating::from_score(50), Rating::Average);
        assert_eq!(Rating::from_score(49), Rating::BelowAverage);
    }

    #[test]
    fn test_performance_score_clamps() {
        assert_eq!(PerformanceScore::new(180, Trend::Improving).overall_score, 100);
        assert_eq!(PerformanceScore::new(-20, Trend::Declining).overall_score, 0);
        assert_eq!(
            PerformanceScore::new(-20, Trend::Declining).rating,
            Rating::BelowAverage
        );
    }

    #[test]
    fn test_sport_parsing() {
        assert_eq!("nba".parse::<Sport>().unwrap(), Sport::NBA);
        assert_eq!("Soccer".parse::<Sport>().unwrap(), Sport::Soccer);
        assert!("cricket".parse::<Sport>().is_err());
    }

    #[test]
    fn test_sentiment_classification() {
        assert_eq!(Sentiment::classify(0.05), Sentiment::Positive);
        assert_eq!(Sentiment::classify(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::classify(-0.2), Sentiment::Negative);
    }
}

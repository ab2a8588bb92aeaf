//! Lexicon-based headline sentiment

use std::collections::HashMap;

use crate::agents::SentimentAnalyzer;
use crate::domain::{NewsItem, Sentiment, SentimentDistribution, SentimentReport};

const POSITIVE_WORDS: &[&str] = &[
    "wins", "win", "victory", "scores", "leads", "best", "record", "amazing", "strong",
    "dominant", "mvp", "extension", "clutch", "career-high", "excelente", "racha", "gana",
];

const NEGATIVE_WORDS: &[&str] = &[
    "injury", "injured", "loses", "loss", "defeat", "worst", "struggles", "benched",
    "suspended", "slump", "surgery", "lesión", "lesionado", "derrota",
];

#[derive(Debug, Clone, Default)]
pub struct KeywordSentimentAnalyzer;

impl KeywordSentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Polarity in [-1, 1]: (positive - negative) / matched words
    pub fn score_text(text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();

        let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(w)).count() as f64;
        let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(w)).count() as f64;

        if positive + negative == 0.0 {
            0.0
        } else {
            (positive - negative) / (positive + negative)
        }
    }
}

impl SentimentAnalyzer for KeywordSentimentAnalyzer {
    fn analyze(&self, items: &[NewsItem]) -> SentimentReport {
        let scores: Vec<f64> = items
            .iter()
            .filter(|item| !item.title.is_empty())
            .map(|item| Self::score_text(&item.title))
            .collect();

        if scores.is_empty() {
            return SentimentReport {
                overall_sentiment: Sentiment::Neutral,
                sentiment_score: 0.0,
                confidence: 0.0,
                distribution: SentimentDistribution::default(),
                recommendation: recommendation(Sentiment::Neutral).to_string(),
            };
        }

        let mut distribution = SentimentDistribution::default();
        let mut counts: HashMap<Sentiment, u32> = HashMap::new();
        for score in &scores {
            let class = Sentiment::classify(*score);
            *counts.entry(class).or_default() += 1;
            match class {
                Sentiment::Positive => distribution.positive += 1,
                Sentiment::Neutral => distribution.neutral += 1,
                Sentiment::Negative => distribution.negative += 1,
            }
        }

        let average = scores.iter().sum::<f64>() / scores.len() as f64;
        let overall = Sentiment::classify(average);
        let most_common = counts.values().copied().max().unwrap_or(0);
        let consistency = f64::from(most_common) / scores.len() as f64;

        SentimentReport {
            overall_sentiment: overall,
            sentiment_score: round_to(average, 3),
            confidence: round_to(consistency, 2),
            distribution,
            recommendation: recommendation(overall).to_string(),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn recommendation(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => {
            "📈 El sentimiento público es positivo - puede aumentar la demanda de tarjetas"
        }
        Sentiment::Negative => "📉 El sentimiento público es negativo - posible impacto en precios",
        Sentiment::Neutral => "➡️ Sentimiento neutral - monitorear de cerca",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            url: "#".into(),
            published: String::new(),
            source: "test".into(),
        }
    }

    #[test]
    fn test_score_text() {
        assert_eq!(KeywordSentimentAnalyzer::score_text("Lakers win, James scores 40"), 1.0);
        assert_eq!(KeywordSentimentAnalyzer::score_text("Star benched after injury"), -1.0);
        assert_eq!(KeywordSentimentAnalyzer::score_text("Trade rumors continue"), 0.0);
    }

    #[test]
    fn test_aggregate_report() {
        let analyzer = KeywordSentimentAnalyzer::new();
        let report = analyzer.analyze(&[
            headline("James leads Lakers to victory"),
            headline("Record night for James"),
            headline("Lakers travel to Denver"),
            headline("Ankle injury scare"),
        ]);

        assert_eq!(report.overall_sentiment, Sentiment::Positive);
        assert_eq!(report.sentiment_score, 0.25);
        assert_eq!(report.confidence, 0.5);
        assert_eq!(
            report.distribution,
            SentimentDistribution {
                positive: 2,
                neutral: 1,
                negative: 1
            }
        );
        assert!(report.recommendation.contains("positivo"));
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let report = KeywordSentimentAnalyzer::new().analyze(&[]);
        assert_eq!(report.overall_sentiment, Sentiment::Neutral);
        assert_eq!(report.confidence, 0.0);
    }
}

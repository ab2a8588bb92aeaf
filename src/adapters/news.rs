//! Player news from the Google News RSS feed
//!
//! When the feed cannot be read the client answers with simulated
//! headlines, flagged as such on the returned [`NewsFeed`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::agents::NewsProvider;
use crate::config::NewsConfig;
use crate::domain::{NewsFeed, NewsItem, Sport};
use crate::error::Result;

const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; cardlens/0.1)";

pub struct GoogleNewsClient {
    http: reqwest::Client,
    max_items: usize,
}

impl GoogleNewsClient {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            max_items: config.max_items,
        })
    }

    async fn fetch(&self, player: &str, sport: Sport) -> Result<Vec<NewsItem>> {
        let query = format!("{} {}", player, sport);
        let url = format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            GOOGLE_NEWS_RSS,
            urlencoding::encode(&query)
        );

        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_rss_items(&body, self.max_items))
    }
}

#[async_trait]
impl NewsProvider for GoogleNewsClient {
    async fn player_news(&self, name: &str, sport: Sport) -> Result<NewsFeed> {
        match self.fetch(name, sport).await {
            Ok(items) => {
                debug!(player = name, count = items.len(), "Fetched news");
                Ok(NewsFeed {
                    items,
                    simulated: false,
                })
            }
            Err(e) => {
                warn!(
                    player = name,
                    error = %e,
                    "News feed unavailable, using simulated headlines"
                );
                Ok(simulated_feed(name))
            }
        }
    }
}

/// Always answers with simulated headlines. Used when live news is disabled.
#[derive(Debug, Clone, Default)]
pub struct SimulatedNewsProvider;

#[async_trait]
impl NewsProvider for SimulatedNewsProvider {
    async fn player_news(&self, name: &str, _sport: Sport) -> Result<NewsFeed> {
        Ok(simulated_feed(name))
    }
}

fn simulated_feed(player: &str) -> NewsFeed {
    let item = |title: String, published: &str| NewsItem {
        title,
        url: "#".to_string(),
        published: published.to_string(),
        source: "Simulated".to_string(),
    };

    NewsFeed {
        items: vec![
            item(format!("{} shows strong performance in recent game", player), "2 days ago"),
            item(format!("Team scouts watching {} closely", player), "3 days ago"),
            item(format!("{} contract extension discussed", player), "5 days ago"),
        ],
        simulated: true,
    }
}

/// Pulls `<item>` title/link/pubDate out of an RSS document
fn parse_rss_items(xml: &str, limit: usize) -> Vec<NewsItem> {
    let mut items = Vec::new();
    let mut rest = xml;

    while items.len() < limit {
        let Some(start) = rest.find("<item>") else {
            break;
        };
        let after = &rest[start + "<item>".len()..];
        let Some(end) = after.find("</item>") else {
            break;
        };
        let block = &after[..end];
        rest = &after[end + "</item>".len()..];

        let (Some(title), Some(link)) = (tag_text(block, "title"), tag_text(block, "link")) else {
            continue;
        };
        items.push(NewsItem {
            title,
            url: link,
            published: tag_text(block, "pubDate").unwrap_or_else(|| "Unknown".to_string()),
            source: tag_text(block, "source").unwrap_or_else(|| "Google News".to_string()),
        });
    }

    items
}

fn tag_text(block: &str, tag: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let start = block.find(&open)?;
    let content_start = start + block[start..].find('>')? + 1;
    let content_len = block[content_start..].find(&close)?;
    let raw = block[content_start..content_start + content_len].trim();

    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(raw);

    let text = raw
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>"LeBron James NBA" - Google News</title>
<item><title>LeBron James scores 40 in Lakers win - ESPN</title><link>https://news.google.com/articles/a1</link><pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate><source url="https://www.espn.com">ESPN</source></item>
<item><title><![CDATA[Lakers & Warriors preview]]></title><link>https://news.google.com/articles/a2</link></item>
<item><title>No link here</title></item>
<item><title>Third</title><link>https://news.google.com/articles/a3</link></item>
</channel></rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let items = parse_rss_items(FEED, 5);
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].title, "LeBron James scores 40 in Lakers win - ESPN");
        assert_eq!(items[0].source, "ESPN");
        assert_eq!(items[0].published, "Mon, 06 Jan 2025 10:00:00 GMT");

        assert_eq!(items[1].title, "Lakers & Warriors preview");
        assert_eq!(items[1].published, "Unknown");
        assert_eq!(items[1].source, "Google News");
    }

    #[test]
    fn test_parse_rss_respects_limit() {
        assert_eq!(parse_rss_items(FEED, 1).len(), 1);
        assert!(parse_rss_items("<rss></rss>", 5).is_empty());
    }

    #[tokio::test]
    async fn test_simulated_provider_flags_output() {
        let feed = SimulatedNewsProvider
            .player_news("Connor McDavid", Sport::NHL)
            .await
            .unwrap();
        assert!(feed.simulated);
        assert_eq!(feed.items.len(), 3);
        assert!(feed.items.iter().all(|i| i.source == "Simulated"));
        assert_eq!(feed.items[2].title, "Connor McDavid contract extension discussed");
    }
}

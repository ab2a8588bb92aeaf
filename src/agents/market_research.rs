//! Market Research Agent
//!
//! Computes sold-listing price statistics for one card. Upstream failures
//! never escape this agent: rate limits, timeouts, an open circuit and any
//! other search error all become a fallback report with the reason in
//! the insight.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::coordination::{CircuitBreaker, CircuitState};
use crate::domain::{CardKeywords, Liquidity, MarketReport, MarketSnapshot, SearchQuery};
use crate::error::{BreakerError, CardError, Result, SearchError};

use super::traits::SearchProvider;

pub const AGENT_NAME: &str = "Market Research Agent";

const RATE_LIMIT_MESSAGE: &str = "Rate limited by the marketplace, please try again later";
const NO_SALES_INSIGHT: &str = "No hay suficientes datos de ventas para analizar.";

/// Cache and breaker introspection
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cache_ttl_secs: u64,
    pub circuit_breaker_state: CircuitState,
    pub circuit_breaker_failures: u32,
}

pub struct MarketResearchAgent {
    search: Arc<dyn SearchProvider>,
    breaker: CircuitBreaker,
    cache: TtlCache<MarketReport>,
    max_results: u32,
    request_timeout: Duration,
}

impl MarketResearchAgent {
    pub fn new(search: Arc<dyn SearchProvider>, config: &AppConfig) -> Self {
        Self {
            search,
            breaker: CircuitBreaker::new("marketplace", config.circuit_breaker.clone()),
            cache: TtlCache::new(config.cache.ttl()),
            max_results: config.marketplace.max_results,
            request_timeout: config.marketplace.request_timeout(),
        }
    }

    /// Research sold prices for `{player} {year} {manufacturer}`.
    ///
    /// Only invalid input is an error; every upstream problem is reported
    /// through [`MarketReport::error`].
    #[instrument(skip(self), fields(context_id = tracing::field::Empty))]
    pub async fn research(
        &self,
        player: &str,
        year: i32,
        manufacturer: &str,
        use_cache: bool,
    ) -> Result<MarketReport> {
        if player.trim().is_empty() {
            return Err(CardError::Validation("player name is required".to_string()));
        }

        let query = CardKeywords::for_card(player, year, manufacturer);
        let context_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("context_id", context_id.as_str());

        if use_cache {
            if let Some(mut cached) = self.cache.get(&query) {
                debug!(query = %query, "Using cached market data");
                cached.from_cache = true;
                return Ok(cached);
            }
        }

        let search_query = SearchQuery::new(query.clone())
            .max_results(self.max_results)
            .sold_only(true);

        let outcome = self
            .breaker
            .call(|| async {
                match tokio::time::timeout(self.request_timeout, self.search.search(&search_query))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SearchError::Timeout {
                        secs: self.request_timeout.as_secs(),
                    }),
                }
            })
            .await;

        let records = match outcome {
            Ok(records) => records,
            Err(err) => {
                let message = fallback_message(&err);
                warn!(query = %query, error = %err, "Market search failed, returning fallback");
                return Ok(MarketReport {
                    agent: AGENT_NAME.to_string(),
                    card: query,
                    timestamp: Utc::now(),
                    context_id,
                    from_cache: false,
                    market_analysis: MarketSnapshot::unavailable(&message),
                    error: Some(message),
                });
            }
        };

        let Some(mut snapshot) = MarketSnapshot::from_sales(&records) else {
            info!(query = %query, "No sold listings found");
            return Ok(MarketReport {
                agent: AGENT_NAME.to_string(),
                card: query,
                timestamp: Utc::now(),
                context_id,
                from_cache: false,
                error: None,
                market_analysis: MarketSnapshot::empty(NO_SALES_INSIGHT),
            });
        };

        snapshot.insight = generate_insight(&snapshot);
        info!(
            query = %query,
            sold = snapshot.sold_count,
            average = %snapshot.average_price,
            liquidity = %snapshot.liquidity,
            "Market research complete"
        );

        let report = MarketReport {
            agent: AGENT_NAME.to_string(),
            card: query.clone(),
            timestamp: Utc::now(),
            context_id,
            from_cache: false,
            error: None,
            market_analysis: snapshot,
        };
        self.cache.insert(query, report.clone());

        Ok(report)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let breaker = self.breaker.stats().await;
        CacheStats {
            cache_size: self.cache.len(),
            cache_ttl_secs: self.cache.ttl().as_secs(),
            circuit_breaker_state: breaker.state,
            circuit_breaker_failures: breaker.failure_count,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Market research cache cleared");
    }
}

fn fallback_message(err: &BreakerError<SearchError>) -> String {
    match err {
        BreakerError::Inner(e) if e.is_rate_limited() => RATE_LIMIT_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

/// Sample-size caveat, liquidity commentary and price segment, in that order
fn generate_insight(snapshot: &MarketSnapshot) -> String {
    let mut parts = Vec::new();

    if snapshot.sold_count < 3 {
        parts.push("Datos limitados - precaución al tomar decisiones.");
    } else if snapshot.sold_count >= 10 {
        parts.push("Mercado activo con buena muestra de datos.");
    }

    match snapshot.liquidity {
        Liquidity::High => parts.push("Alta liquidez - fácil encontrar compradores."),
        Liquidity::Low => parts.push("Baja liquidez - puede haber dificultad para vender."),
        _ => {}
    }

    parts.push(price_segment(snapshot.average_price));
    parts.join(" ")
}

fn price_segment(average: Decimal) -> &'static str {
    if average > dec!(1000) {
        "Segmento premium."
    } else if average > dec!(500) {
        "Segmento de precio medio-alto."
    } else if average > dec!(100) {
        "Segmento de precio medio."
    } else {
        "Segmento económico."
    }
}

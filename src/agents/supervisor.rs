//! Supervisor
//!
//! Runs market research and player analysis concurrently, waits for both,
//! feeds them to the strategy agent and returns one consolidated result.
//! Persisting the result happens in a background task and never affects
//! what the caller receives.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    AnalysisRecord, BudgetAssessment, CardInfo, DetailedAnalysis, InvestmentAnalysis,
    Recommendation, Sport,
};

use super::market_research::MarketResearchAgent;
use super::player_analysis::PlayerAnalysisAgent;
use super::strategy::StrategyAgent;
use super::traits::AnalysisStore;

pub const SUPERVISOR_NAME: &str = "Supervisor Agent";
const ANALYSIS_TYPE: &str = "multi_agent";

const RETRY_SUGGESTION: &str = "Verifique los datos de la tarjeta e intente nuevamente.";
const MARKET_DOWN_SUGGESTION: &str =
    "Los datos de mercado no están disponibles en este momento. Intente nuevamente más tarde.";
const NO_SALES_SUGGESTION: &str =
    "No se encontraron ventas recientes. Pruebe con otro año o fabricante.";

pub struct Supervisor {
    market: MarketResearchAgent,
    player: PlayerAnalysisAgent,
    strategy: StrategyAgent,
    store: Option<Arc<dyn AnalysisStore>>,
    pending_saves: Mutex<JoinSet<()>>,
}

impl Supervisor {
    pub fn new(
        market: MarketResearchAgent,
        player: PlayerAnalysisAgent,
        strategy: StrategyAgent,
    ) -> Self {
        Self {
            market,
            player,
            strategy,
            store: None,
            pending_saves: Mutex::new(JoinSet::new()),
        }
    }

    /// Persist every successful analysis to `store`
    pub fn with_store(mut self, store: Arc<dyn AnalysisStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    #[instrument(skip(self, budget), fields(context_id = tracing::field::Empty))]
    pub async fn analyze_investment_opportunity(
        &self,
        player: &str,
        year: i32,
        manufacturer: &str,
        sport: Sport,
        budget: Decimal,
    ) -> InvestmentAnalysis {
        let context_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("context_id", context_id.as_str());

        let card = CardInfo {
            player: player.to_string(),
            year,
            manufacturer: manufacturer.to_string(),
            sport,
        };
        info!(player, year, manufacturer, sport = %sport, "Starting multi-agent analysis");

        // Both branches always run to completion; neither cancels the other.
        let (market, player_report) = tokio::join!(
            self.market.research(player, year, manufacturer, true),
            self.player.analyze(player, sport, None)
        );

        let (market, player_report) = match (market, player_report) {
            (Ok(market), Ok(player_report)) => (market, player_report),
            (market, player_report) => {
                let errors: Vec<String> = [
                    market.err().map(|e| format!("market research: {}", e)),
                    player_report.err().map(|e| format!("player analysis: {}", e)),
                ]
                .into_iter()
                .flatten()
                .collect();
                let message = errors.join("; ");
                error!(error = %message, "Sub-agent failed");
                return failure(context_id, card, message, RETRY_SUGGESTION, None);
            }
        };

        let strategy_report = self
            .strategy
            .generate(&market.market_analysis, &player_report, &card);

        let detailed = DetailedAnalysis {
            market,
            player: player_report,
            strategy: strategy_report,
        };

        let Some(strategy) = detailed.strategy.strategy.clone() else {
            let message = detailed
                .strategy
                .error
                .clone()
                .unwrap_or_else(|| "Strategy could not be generated".to_string());
            let suggestion = if detailed.market.is_fallback() {
                MARKET_DOWN_SUGGESTION
            } else {
                NO_SALES_SUGGESTION
            };
            warn!(error = %message, "Strategy agent returned an error");
            return failure(context_id, card, message, suggestion, Some(detailed));
        };

        let uses_estimated_data = detailed
            .strategy
            .data_quality
            .map(|q| q.player_score_estimated || q.price_estimated)
            .unwrap_or(false);

        self.persist(AnalysisRecord {
            card: card.clone(),
            market: detailed.market.clone(),
            player: detailed.player.clone(),
            strategy: detailed.strategy.clone(),
            analysis_type: ANALYSIS_TYPE.to_string(),
            created_at: Utc::now(),
        })
        .await;

        info!(
            signal = %strategy.signal,
            entry = %strategy.price_targets.entry_price,
            estimated = uses_estimated_data,
            "Analysis complete"
        );

        InvestmentAnalysis {
            success: true,
            supervisor: SUPERVISOR_NAME.to_string(),
            timestamp: Utc::now(),
            context_id,
            card,
            budget: Some(BudgetAssessment::new(
                budget,
                strategy.price_targets.entry_price,
            )),
            recommendation: Some(Recommendation {
                signal: strategy.signal,
                confidence: strategy.confidence,
                price_targets: strategy.price_targets,
                risk_reward: strategy.risk_reward,
            }),
            detailed_analysis: Some(detailed),
            reasoning: strategy.reasoning,
            action_items: strategy.action_items,
            uses_estimated_data,
            error: None,
            suggestion: None,
        }
    }

    /// Background save; failures are logged only
    async fn persist(&self, record: AnalysisRecord) {
        let Some(store) = self.store.clone() else {
            return;
        };

        let mut pending = self.pending_saves.lock().await;
        // Reap saves that already finished
        while pending.try_join_next().is_some() {}

        pending.spawn(async move {
            match store.save_analysis(&record).await {
                Ok(()) => info!(player = %record.card.player, "Analysis saved"),
                Err(e) => {
                    warn!(player = %record.card.player, error = %e, "Failed to save analysis")
                }
            }
        });
    }

    /// Wait up to `timeout` for background saves.
    ///
    /// Returns how many saves were still running when the wait gave up;
    /// those are aborted.
    pub async fn flush(&self, timeout: Duration) -> usize {
        let mut pending = std::mem::take(&mut *self.pending_saves.lock().await);
        if pending.is_empty() {
            return 0;
        }

        let drained = tokio::time::timeout(timeout, async {
            while let Some(result) = pending.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "Background save task failed");
                }
            }
        })
        .await;

        if drained.is_err() {
            let unfinished = pending.len();
            warn!(
                unfinished,
                timeout_secs = timeout.as_secs(),
                "Gave up waiting for analysis saves"
            );
            pending.abort_all();
            return unfinished;
        }
        0
    }
}

fn failure(
    context_id: String,
    card: CardInfo,
    error: String,
    suggestion: &str,
    detailed_analysis: Option<DetailedAnalysis>,
) -> InvestmentAnalysis {
    InvestmentAnalysis {
        success: false,
        supervisor: SUPERVISOR_NAME.to_string(),
        timestamp: Utc::now(),
        context_id,
        card,
        recommendation: None,
        budget: None,
        detailed_analysis,
        reasoning: String::new(),
        action_items: Vec::new(),
        uses_estimated_data: false,
        error: Some(error),
        suggestion: Some(suggestion.to_string()),
    }
}

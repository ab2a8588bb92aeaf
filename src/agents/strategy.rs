//! Strategy Agent
//!
//! Deterministic rules from (average price, player score) to a signal,
//! price targets and templated reasoning. Thresholds and multipliers come
//! from [`StrategyConfig`] and can be changed at runtime.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StrategyConfig;
use crate::domain::{
    round_price, CardInfo, DataQuality, MarketSnapshot, PlayerReport, PriceTargets, RiskReward,
    Signal, Strategy, StrategyReport,
};
use crate::error::{CardError, Result};

pub const AGENT_NAME: &str = "Trading Strategy Agent";

/// Fewer sold listings than this and the average price counts as estimated
const MIN_RELIABLE_SALES: usize = 3;

const ESTIMATED_PRICE_NOTE: &str = " (precio estimado basado en datos limitados)";
const ESTIMATED_SCORE_NOTE: &str = " (score estimado)";

/// Partial update for [`StrategyAgent::set_thresholds`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdUpdate {
    pub buy_threshold: Option<u8>,
    pub hold_threshold: Option<u8>,
    pub entry_discount: Option<Decimal>,
    pub target_multiplier: Option<Decimal>,
    pub stop_loss_discount: Option<Decimal>,
}

pub struct StrategyAgent {
    // std lock: `generate` is sync and never holds it across an await
    config: RwLock<StrategyConfig>,
}

impl Default for StrategyAgent {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}

impl StrategyAgent {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Current thresholds and multipliers
    pub fn thresholds(&self) -> StrategyConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Apply a partial update. Rejected updates leave the configuration unchanged.
    pub fn set_thresholds(&self, update: ThresholdUpdate) -> Result<StrategyConfig> {
        let mut config = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut next = config.clone();
        if let Some(v) = update.buy_threshold {
            next.buy_threshold = v;
        }
        if let Some(v) = update.hold_threshold {
            next.hold_threshold = v;
        }
        if let Some(v) = update.entry_discount {
            next.entry_discount = v;
        }
        if let Some(v) = update.target_multiplier {
            next.target_multiplier = v;
        }
        if let Some(v) = update.stop_loss_discount {
            next.stop_loss_discount = v;
        }

        next.validate().map_err(|errors| CardError::Validation(errors.join("; ")))?;

        *config = next.clone();
        info!(
            buy = next.buy_threshold,
            hold = next.hold_threshold,
            entry = %next.entry_discount,
            target = %next.target_multiplier,
            stop_loss = %next.stop_loss_discount,
            "Strategy thresholds updated"
        );
        Ok(next)
    }

    /// Build a strategy for one card.
    ///
    /// Fails (as data, `strategy: None`) when no positive average price is
    /// available.
    pub fn generate(
        &self,
        market: &MarketSnapshot,
        player: &PlayerReport,
        card: &CardInfo,
    ) -> StrategyReport {
        let context_id = Uuid::new_v4().to_string();
        let score = player.performance_score.overall_score;
        let average = market.average_price;
        let quality = DataQuality {
            player_score_estimated: player.is_estimated(),
            price_estimated: market.sold_count < MIN_RELIABLE_SALES,
        };

        if average <= Decimal::ZERO {
            warn!(
                player = %card.player,
                context_id = %context_id,
                "No average price, cannot build strategy"
            );
            return StrategyReport {
                agent: AGENT_NAME.to_string(),
                timestamp: Utc::now(),
                context_id,
                card: card.clone(),
                data_quality: Some(quality),
                strategy: None,
                error: Some(format!(
                    "Unable to determine average price for {}",
                    card.player
                )),
            };
        }

        let config = self.thresholds();
        let signal = signal_for(score, &config);
        let price_targets = PriceTargets {
            entry_price: round_price(average * config.entry_discount),
            target_sell_price: round_price(average * config.target_multiplier),
            stop_loss: round_price(average * config.stop_loss_discount),
            average_price: round_price(average),
        };

        info!(
            player = %card.player,
            context_id = %context_id,
            signal = %signal,
            score,
            average = %average,
            "Strategy generated"
        );

        StrategyReport {
            agent: AGENT_NAME.to_string(),
            timestamp: Utc::now(),
            context_id,
            card: card.clone(),
            data_quality: Some(quality),
            strategy: Some(Strategy {
                signal,
                confidence: signal.confidence(),
                price_targets,
                risk_reward: risk_reward(score),
                reasoning: reasoning(signal, &card.player, score, average, quality),
                action_items: action_items(signal),
            }),
            error: None,
        }
    }
}

fn signal_for(score: u8, config: &StrategyConfig) -> Signal {
    if score >= config.buy_threshold {
        Signal::Buy
    } else if score >= config.hold_threshold {
        Signal::Hold
    } else {
        Signal::Sell
    }
}

pub fn risk_reward(score: u8) -> RiskReward {
    let (ratio, assessment) = match score {
        90..=u8::MAX => ("3.0:1", "Favorable - Alto potencial de apreciación"),
        80..=89 => ("2.5:1", "Favorable - Buena relación riesgo/recompensa"),
        70..=79 => ("2.0:1", "Moderada - Considere otros factores"),
        _ => ("1.5:1", "Desfavorable - Alto riesgo"),
    };
    RiskReward {
        ratio: ratio.to_string(),
        assessment: assessment.to_string(),
    }
}

fn reasoning(
    signal: Signal,
    player: &str,
    score: u8,
    average: Decimal,
    quality: DataQuality,
) -> String {
    let opportunity = match signal {
        Signal::Buy => "una buena",
        Signal::Hold => "una moderada",
        Signal::Sell => "poca",
    };
    let score_note = if quality.player_score_estimated {
        ESTIMATED_SCORE_NOTE
    } else {
        ""
    };
    let price_note = if quality.price_estimated {
        ESTIMATED_PRICE_NOTE
    } else {
        ""
    };

    format!(
        "Recomendación de {}. El jugador {} tiene un score de {}/100{}. \
         Precio promedio de mercado: ${:.2}{}. \
         La tarjeta presenta {} oportunidad de inversión.",
        signal, player, score, score_note, average, price_note, opportunity
    )
}

fn action_items(signal: Signal) -> Vec<String> {
    let specific: [&str; 3] = match signal {
        Signal::Buy => [
            "Buscar oportunidades de compra a precios favorables",
            "Verificar autenticidad antes de comprar",
            "Considerar estado de la tarjeta (grado PSA/BGS)",
        ],
        Signal::Hold => [
            "Mantener posición actual",
            "Monitorear rendimiento del jugador",
            "Establecer alertas de precio para movimiento",
        ],
        Signal::Sell => [
            "Considerar venta si el precio es aceptable",
            "Evaluar momento óptimo para vender",
            "Diversificar hacia jugadores con mejor outlook",
        ],
    };

    specific
        .iter()
        .chain(&[
            "Revisar análisis de mercado actualizado",
            "Consultar noticias recientes del jugador",
        ])
        .map(|s| s.to_string())
        .collect()
}

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::domain::{InvestmentAnalysis, Signal, Sport};

#[derive(Parser)]
#[command(name = "cardlens")]
#[command(version = "0.1.0")]
#[command(about = "Sports card investment analysis", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration directory
    #[arg(short, long, env = "CARDLENS_CONFIG_DIR", default_value = "config", global = true)]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the multi-agent analysis for one card
    Analyze {
        /// Player name (e.g., "LeBron James")
        #[arg(short, long)]
        player: String,
        /// Card year
        #[arg(short, long)]
        year: i32,
        /// Card manufacturer
        #[arg(short, long, default_value = "Topps")]
        manufacturer: String,
        /// NBA, NHL, MLB, NFL or Soccer
        #[arg(short, long, default_value = "NBA")]
        sport: Sport,
        /// Available budget in USD
        #[arg(short, long, default_value = "1000")]
        budget: Decimal,
        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration and validate it
    Config,
}

fn signal_color(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "\x1b[32m",
        Signal::Hold => "\x1b[33m",
        Signal::Sell => "\x1b[31m",
    }
}

/// Human-readable report for the terminal
pub fn print_analysis(analysis: &InvestmentAnalysis) {
    let card = &analysis.card;
    println!(
        "\x1b[36m═══ {} {} {} ({}) ═══\x1b[0m\n",
        card.player, card.year, card.manufacturer, card.sport
    );

    if !analysis.success {
        println!(
            "\x1b[31m✗ {}\x1b[0m",
            analysis.error.as_deref().unwrap_or("Analysis failed")
        );
        if let Some(suggestion) = &analysis.suggestion {
            println!("  {}", suggestion);
        }
        return;
    }

    if let Some(rec) = &analysis.recommendation {
        println!(
            "{}{} \x1b[0m(confidence {:.0}%)",
            signal_color(rec.signal),
            rec.signal,
            rec.confidence * 100.0
        );
        println!("\n\x1b[33mPrice targets:\x1b[0m");
        println!("   Average:     ${:.2}", rec.price_targets.average_price);
        println!("   Entry:       ${:.2}", rec.price_targets.entry_price);
        println!("   Target sell: ${:.2}", rec.price_targets.target_sell_price);
        println!("   Stop loss:   ${:.2}", rec.price_targets.stop_loss);
        println!(
            "   Risk/reward: {} ({})",
            rec.risk_reward.ratio, rec.risk_reward.assessment
        );
    }

    if let Some(budget) = &analysis.budget {
        let mark = if budget.within_budget {
            "\x1b[32m✓\x1b[0m"
        } else {
            "\x1b[31m✗\x1b[0m"
        };
        println!(
            "   Budget:      {} ${:.2} (up to {} at entry)",
            mark, budget.budget, budget.max_units
        );
    }

    if let Some(detail) = &analysis.detailed_analysis {
        println!("\n\x1b[33mMarket:\x1b[0m");
        let market = &detail.market.market_analysis;
        println!(
            "   {} sold, liquidity {}{}",
            market.sold_count,
            market.liquidity,
            if detail.market.from_cache { " (cached)" } else { "" }
        );
        println!("   {}", market.insight);

        println!("\n\x1b[33mPlayer:\x1b[0m");
        println!("   {}", detail.player.future_outlook);
        if let Some(sentiment) = &detail.player.sentiment {
            println!("   {}", sentiment.recommendation);
        }
    }

    println!("\n{}", analysis.reasoning);
    if analysis.uses_estimated_data {
        println!("\x1b[33m⚠ Based partly on simulated or limited data\x1b[0m");
    }

    println!("\n\x1b[33mNext steps:\x1b[0m");
    for item in &analysis.action_items {
        println!("   • {}", item);
    }
}

pub fn print_config(config: &AppConfig) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    match config.validate() {
        Ok(()) => println!("\n\x1b[32m✓ Configuration is valid\x1b[0m"),
        Err(errors) => {
            println!("\n\x1b[31m✗ Configuration has {} problem(s):\x1b[0m", errors.len());
            for error in errors {
                println!("   - {}", error);
            }
        }
    }
    Ok(())
}

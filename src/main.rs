use anyhow::Context;
use cardlens::cli::{self, Cli, Commands};
use cardlens::config::AppConfig;
use clap::Parser;
use std::time::Duration;
use tracing::error;

mod main_runtime;

use main_runtime::{build_supervisor, init_logging};

const SAVE_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;

    match cli.command {
        Commands::Config => {
            cli::print_config(&config)?;
        }
        Commands::Analyze {
            player,
            year,
            manufacturer,
            sport,
            budget,
            json,
        } => {
            init_logging(&config.logging);
            if let Err(errors) = config.validate() {
                for e in &errors {
                    error!("Invalid configuration: {}", e);
                }
                anyhow::bail!("invalid configuration ({} problem(s))", errors.len());
            }

            let supervisor = build_supervisor(&config)
                .await
                .context("failed to initialise agents")?;
            let analysis = supervisor
                .analyze_investment_opportunity(&player, year, &manufacturer, sport, budget)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                cli::print_analysis(&analysis);
            }

            // Saves still running when the runtime shuts down would be lost
            supervisor.flush(SAVE_FLUSH_TIMEOUT).await;

            if !analysis.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

use cardlens::adapters::{
    EbayClient, GoogleNewsClient, KeywordSentimentAnalyzer, PostgresStore, SimulatedNewsProvider,
    SimulatedStatsProvider,
};
use cardlens::agents::{
    MarketResearchAgent, NewsProvider, PlayerAnalysisAgent, StrategyAgent, Supervisor,
};
use cardlens::config::{AppConfig, LoggingConfig};
use cardlens::error::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},cardlens=debug,sqlx=warn", config.level))
    });

    // File logging only when CARDLENS_LOG_DIR is set and writable.
    // `tracing_appender::rolling::daily` panics if it cannot create the file.
    let file_layer = std::env::var("CARDLENS_LOG_DIR").ok().and_then(|log_dir| {
        if std::fs::create_dir_all(&log_dir).is_err() {
            eprintln!(
                "Warning: Could not create log directory {}, file logging disabled",
                log_dir
            );
            return None;
        }

        let test_path = std::path::Path::new(&log_dir).join(".cardlens_write_test");
        if let Err(e) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                log_dir, e
            );
            return None;
        }
        let _ = std::fs::remove_file(&test_path);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "cardlens.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Flushes on drop; the process keeps it for its whole lifetime
        Box::leak(Box::new(guard));

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
    });

    // Logs go to stderr so `--json` output on stdout stays clean
    let (json_layer, text_layer) = if config.json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
        )
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init();
}

/// Wire the production adapters into a supervisor
pub async fn build_supervisor(config: &AppConfig) -> Result<Supervisor> {
    let search = Arc::new(EbayClient::new(&config.marketplace)?);
    if config.marketplace.resolved_app_id().is_none() {
        warn!("No eBay app id configured; market data will be unavailable");
    }

    let news: Arc<dyn NewsProvider> = if config.news.enabled {
        Arc::new(GoogleNewsClient::new(&config.news)?)
    } else {
        Arc::new(SimulatedNewsProvider)
    };

    let market = MarketResearchAgent::new(search, config);
    let player = PlayerAnalysisAgent::new(
        Arc::new(SimulatedStatsProvider::new()),
        news,
        Arc::new(KeywordSentimentAnalyzer::new()),
        config,
    );
    let strategy = StrategyAgent::new(config.strategy.clone());
    let mut supervisor = Supervisor::new(market, player, strategy);

    if let Some(url) = config.database.url.as_deref() {
        match connect_store(url, config.database.max_connections).await {
            Ok(store) => {
                supervisor = supervisor.with_store(Arc::new(store));
                info!("Analysis persistence enabled");
            }
            Err(e) => warn!(error = %e, "Database unavailable, analyses will not be saved"),
        }
    }

    Ok(supervisor)
}

async fn connect_store(url: &str, max_connections: u32) -> Result<PostgresStore> {
    let store = PostgresStore::new(url, max_connections).await?;
    store.migrate().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unreachable_database_still_builds_supervisor() {
        let mut config = AppConfig::default();
        config.database.url = Some("postgres://cardlens@127.0.0.1:1/cardlens".to_string());
        config.news.enabled = false;

        let supervisor = build_supervisor(&config).await.unwrap();
        assert!(!supervisor.has_store());
        assert_eq!(supervisor.flush(Duration::from_secs(1)).await, 0);
    }
}

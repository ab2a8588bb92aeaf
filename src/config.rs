use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceConfig {
    /// eBay Finding API endpoint
    #[serde(default = "default_marketplace_url")]
    pub base_url: String,
    /// eBay application id (falls back to EBAY_APP_ID)
    #[serde(default)]
    pub app_id: Option<String>,
    /// Sold listings requested per search
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Timeout applied to every outbound search
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_marketplace_url() -> String {
    "https://svcs.ebay.com/services/search/FindingService/v1".to_string()
}

fn default_max_results() -> u32 {
    20
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: default_marketplace_url(),
            app_id: None,
            max_results: default_max_results(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl MarketplaceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured app id, or the EBAY_APP_ID environment variable
    pub fn resolved_app_id(&self) -> Option<String> {
        self.app_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| std::env::var("EBAY_APP_ID").ok().filter(|id| !id.is_empty()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a market snapshot stays fresh (default: 15 minutes)
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    900
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the breaker opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Seconds to wait before retrying a tripped dependency
    #[serde(default = "default_recovery_timeout")]
    pub recovery_timeout_secs: u64,
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_recovery_timeout() -> u64 {
    60
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout(),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.recovery_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Score at or above which the signal is BUY
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: u8,
    /// Score at or above which the signal is HOLD
    #[serde(default = "default_hold_threshold")]
    pub hold_threshold: u8,
    /// Entry price as a fraction of the average price (e.g., 0.95 = 5% below)
    #[serde(default = "default_entry_discount")]
    pub entry_discount: Decimal,
    /// Target sell price as a multiple of the average price
    #[serde(default = "default_target_multiplier")]
    pub target_multiplier: Decimal,
    /// Stop loss as a fraction of the average price
    #[serde(default = "default_stop_loss_discount")]
    pub stop_loss_discount: Decimal,
}

fn default_buy_threshold() -> u8 {
    85
}

fn default_hold_threshold() -> u8 {
    70
}

fn default_entry_discount() -> Decimal {
    dec!(0.95)
}

fn default_target_multiplier() -> Decimal {
    dec!(1.25)
}

fn default_stop_loss_discount() -> Decimal {
    dec!(0.85)
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            buy_threshold: default_buy_threshold(),
            hold_threshold: default_hold_threshold(),
            entry_discount: default_entry_discount(),
            target_multiplier: default_target_multiplier(),
            stop_loss_discount: default_stop_loss_discount(),
        }
    }
}

impl StrategyConfig {
    /// Checks shared by config loading and
    /// [`StrategyAgent::set_thresholds`](crate::agents::StrategyAgent::set_thresholds)
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.buy_threshold > 100 {
            errors.push("buy_threshold must be between 0 and 100".to_string());
        }
        if self.hold_threshold >= self.buy_threshold {
            errors.push("hold_threshold must be below buy_threshold".to_string());
        }
        if self.entry_discount <= Decimal::ZERO
            || self.target_multiplier <= Decimal::ZERO
            || self.stop_loss_discount <= Decimal::ZERO
        {
            errors.push("price multipliers must be positive".to_string());
        }
        if self.stop_loss_discount >= self.entry_discount {
            errors.push("stop_loss_discount must be below entry_discount".to_string());
        }
        if self.entry_discount >= self.target_multiplier {
            errors.push("entry_discount must be below target_multiplier".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    /// Upper bound on one player statistics lookup
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl StatsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsConfig {
    /// Fetch live headlines (simulated headlines are used when disabled)
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_news_items")]
    pub max_items: usize,
    #[serde(default = "default_news_timeout")]
    pub request_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_news_items() -> usize {
    5
}

fn default_news_timeout() -> u64 {
    10
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: default_news_items(),
            request_timeout_secs: default_news_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; analyses are not persisted when unset
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CARDLENS_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CARDLENS_CACHE__TTL_SECS, etc.)
            .add_source(
                Environment::with_prefix("CARDLENS")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(strategy_errors) = self.strategy.validate() {
            errors.extend(strategy_errors);
        }

        if self.circuit_breaker.failure_threshold == 0 {
            errors.push("circuit_breaker.failure_threshold must be at least 1".to_string());
        }
        if self.marketplace.request_timeout_secs == 0 {
            errors.push("marketplace.request_timeout_secs must be positive".to_string());
        }
        if self.marketplace.max_results == 0 || self.marketplace.max_results > 100 {
            errors.push("marketplace.max_results must be between 1 and 100".to_string());
        }
        if self.stats.request_timeout_secs == 0 {
            errors.push("stats.request_timeout_secs must be positive".to_string());
        }
        if self.news.request_timeout_secs == 0 {
            errors.push("news.request_timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();

        assert_eq!(config.cache.ttl_secs, 900);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.recovery_timeout_secs, 60);
        assert_eq!(config.marketplace.request_timeout_secs, 30);
        assert_eq!(config.stats.request_timeout_secs, 30);
        assert_eq!(config.strategy.buy_threshold, 85);
        assert_eq!(config.strategy.hold_threshold, 70);
        assert_eq!(config.strategy.entry_discount, dec!(0.95));
        assert_eq!(config.strategy.target_multiplier, dec!(1.25));
        assert_eq!(config.strategy.stop_loss_discount, dec!(0.85));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = AppConfig::default();
        config.strategy.hold_threshold = 90;
        config.strategy.stop_loss_discount = dec!(0.99);
        config.circuit_breaker.failure_threshold = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_strategy_validate_orders_price_levels() {
        let mut strategy = StrategyConfig::default();
        assert!(strategy.validate().is_ok());

        strategy.entry_discount = dec!(1.30);
        let errors = strategy.validate().unwrap_err();
        assert_eq!(errors, vec!["entry_discount must be below target_multiplier"]);
    }

    #[test]
    fn test_zero_stats_timeout_is_rejected() {
        let mut config = AppConfig::default();
        config.stats.request_timeout_secs = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors, vec!["stats.request_timeout_secs must be positive"]);
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let config = AppConfig::load_from("does-not-exist").unwrap();
        assert_eq!(config.cache.ttl_secs, 900);
        assert_eq!(config.logging.level, "info");
    }
}

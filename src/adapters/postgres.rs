use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::agents::AnalysisStore;
use crate::domain::AnalysisRecord;
use crate::error::Result;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Insert one analysis and return its id
    #[instrument(skip(self, record), fields(player = %record.card.player))]
    pub async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<i64> {
        let signal = record
            .strategy
            .strategy
            .as_ref()
            .map(|s| s.signal.as_str().to_string());

        let row = sqlx::query(
            r#"
            INSERT INTO card_analyses (
                player_name, card_year, manufacturer, sport, analysis_type,
                signal, average_price, performance_score,
                market_data, player_data, strategy_data, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::jsonb, $10::jsonb, $11::jsonb, $12)
            RETURNING id
            "#,
        )
        .bind(&record.card.player)
        .bind(record.card.year)
        .bind(&record.card.manufacturer)
        .bind(record.card.sport.as_str())
        .bind(&record.analysis_type)
        .bind(signal)
        .bind(record.market.market_analysis.average_price)
        .bind(i16::from(record.player.performance_score.overall_score))
        .bind(serde_json::to_string(&record.market)?)
        .bind(serde_json::to_string(&record.player)?)
        .bind(serde_json::to_string(&record.strategy)?)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.get("id");
        debug!(id, "Analysis stored");
        Ok(id)
    }
}

#[async_trait]
impl AnalysisStore for PostgresStore {
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<()> {
        self.insert_analysis(record).await.map(|_| ())
    }
}

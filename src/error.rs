use thiserror::Error;

/// Main error type for the analysis pipeline
#[derive(Error, Debug)]
pub enum CardError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for CardError
pub type Result<T> = std::result::Result<T, CardError>;

/// Errors raised by a marketplace search capability.
///
/// `RateLimited` is kept apart from the other variants so callers can
/// tell the user to come back later instead of reporting a generic failure.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Marketplace returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to parse marketplace response: {0}")]
    Parse(String),

    #[error("Marketplace credentials not configured: {0}")]
    NotConfigured(String),
}

impl SearchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SearchError::RateLimited(_))
    }
}

impl From<reqwest::Error> for SearchError {
    /// Timeouts are mapped by the client, which knows its configured limit
    fn from(err: reqwest::Error) -> Self {
        if err.status().map(|s| s.as_u16()) == Some(429) {
            SearchError::RateLimited(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

/// Error returned by [`crate::coordination::CircuitBreaker::call`].
#[derive(Error, Debug, Clone)]
pub enum BreakerError<E> {
    /// The breaker is rejecting calls; the wrapped operation was not invoked.
    #[error("Service temporarily unavailable. Retry after {retry_after_secs}s")]
    Open { retry_after_secs: u64 },

    /// The wrapped operation ran and failed.
    #[error(transparent)]
    Inner(E),
}

impl<E> BreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }
}

//! Circuit breaker for outbound integrations
//!
//! Wraps any async call. After `failure_threshold` consecutive failures the
//! breaker opens and rejects calls without running them. Once
//! `recovery_timeout` has passed since the last failure a single trial call is
//! let through (half-open); its outcome closes or re-opens the circuit.

use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CircuitBreakerConfig;
use crate::error::BreakerError;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Failure threshold exceeded - calls rejected
    Open,
    /// Recovery period - one trial call allowed
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    /// Set while the half-open trial call is running
    trial_started: Option<Instant>,
}

/// Reusable circuit breaker. One instance per protected dependency.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: RwLock<BreakerState>,
    total_trips: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: RwLock::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                trial_started: None,
            }),
            total_trips: AtomicU64::new(0),
        }
    }

    /// Create with default configuration (5 failures, 60s cooldown)
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current state
    pub async fn state(&self) -> CircuitState {
        self.inner.read().await.state
    }

    pub async fn failure_count(&self) -> u32 {
        self.inner.read().await.failure_count
    }

    /// Run `op` through the breaker.
    ///
    /// While open, returns [`BreakerError::Open`] without invoking `op`.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if let Err(retry_after_secs) = self.acquire().await {
            return Err(BreakerError::Open { retry_after_secs });
        }

        match op().await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(e) => {
                self.record_failure(&e.to_string()).await;
                Err(BreakerError::Inner(e))
            }
        }
    }

    /// Admission check. Err carries the seconds left before a retry makes sense.
    async fn acquire(&self) -> Result<(), u64> {
        let recovery = self.config.recovery_timeout();
        let mut inner = self.inner.write().await;

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed > recovery {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_started = Some(Instant::now());
                    info!(breaker = %self.name, "Circuit breaker: entering half-open state");
                    Ok(())
                } else {
                    Err(ceil_secs(recovery.saturating_sub(elapsed)))
                }
            }
            CircuitState::HalfOpen => match inner.trial_started {
                // A trial call that never reported back is abandoned after one cooldown
                Some(started) if started.elapsed() <= recovery => {
                    Err(ceil_secs(recovery.saturating_sub(started.elapsed())))
                }
                _ => {
                    inner.trial_started = Some(Instant::now());
                    Ok(())
                }
            },
        }
    }

    async fn record_success(&self) {
        let mut inner = self.inner.write().await;
        inner.failure_count = 0;
        inner.trial_started = None;

        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Closed;
            info!(breaker = %self.name, "Circuit breaker: closed after successful call");
        }
    }

    async fn record_failure(&self, reason: &str) {
        let mut inner = self.inner.write().await;
        inner.failure_count += 1;
        inner.last_failure = Some(Instant::now());
        inner.trial_started = None;

        debug!(
            breaker = %self.name,
            failures = inner.failure_count,
            "Call failed: {}", reason
        );

        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                self.total_trips.fetch_add(1, Ordering::SeqCst);
                warn!(breaker = %self.name, "Circuit breaker: trial call failed, re-opened");
            }
            CircuitState::Closed if inner.failure_count >= self.config.failure_threshold => {
                inner.state = CircuitState::Open;
                self.total_trips.fetch_add(1, Ordering::SeqCst);
                warn!(
                    breaker = %self.name,
                    "Circuit breaker: opened after {} failures", inner.failure_count
                );
            }
            _ => {}
        }
    }

    /// Force close the circuit (manual reset)
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.last_failure = None;
        inner.trial_started = None;
        warn!(breaker = %self.name, "Circuit breaker force-closed");
    }

    /// Get circuit breaker statistics
    pub async fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.read().await;
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            secs_since_last_failure: inner.last_failure.map(|t| t.elapsed().as_secs()),
            total_trips: self.total_trips.load(Ordering::SeqCst),
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub secs_since_last_failure: Option<u64>,
    pub total_trips: u64,
}

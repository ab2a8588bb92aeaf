//! Fault isolation for outbound integrations

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerStats, CircuitState};

//! Retry configuration and backoff math for the persistence path.
//!
//! Sync-only building blocks; the async retry loop lives in `gavel-hub`
//! where the persistence worker runs.

use serde::{Deserialize, Serialize};

/// Default retry budget for a single message.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 250;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
/// Default jitter factor (0.0–1.0).
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Parameters for the bounded-backoff retry loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Retry attempts after the initial try (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff in ms (default: 250).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on any single delay in ms (default: 5000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter factor 0.0–1.0 (default: 0.2).
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_jitter_factor() -> f64 {
    DEFAULT_JITTER_FACTOR
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

/// Exponential backoff delay with explicit jitter randomness.
///
/// Formula: `min(max_delay, base_delay * 2^attempt) * (1 + (random*2-1) * jitter)`
/// where `random` is in `[0.0, 1.0)` from the caller's PRNG. `attempt` is
/// zero-based (0 = first retry).
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn backoff_delay_ms(
    attempt: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
    random: f64,
) -> u64 {
    let exponential = base_delay_ms.saturating_mul(1u64 << attempt.min(31));
    let capped = exponential.min(max_delay_ms);

    // Maps random [0,1) to a multiplier in [1-jitter, 1+jitter)
    let jitter = 1.0 + (random * 2.0 - 1.0) * jitter_factor;
    let with_jitter = (capped as f64) * jitter;

    with_jitter.round().max(0.0) as u64
}

impl RetryConfig {
    /// Delay before retry number `attempt` (zero-based), jittered.
    #[must_use]
    pub fn delay_ms(&self, attempt: u32, random: f64) -> u64 {
        backoff_delay_ms(
            attempt,
            self.base_delay_ms,
            self.max_delay_ms,
            self.jitter_factor,
            random,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 250);
        assert_eq!(config.max_delay_ms, 5_000);
        assert!((config.jitter_factor - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn config_serde_fills_defaults() {
        let config: RetryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 250);
    }

    #[test]
    fn config_serde_camel_case() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"maxRetries":5,"baseDelayMs":100}"#).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_delay_ms, 100);
    }

    #[test]
    fn backoff_grows_exponentially_without_jitter() {
        let d0 = backoff_delay_ms(0, 100, 60_000, 0.0, 0.5);
        let d1 = backoff_delay_ms(1, 100, 60_000, 0.0, 0.5);
        let d2 = backoff_delay_ms(2, 100, 60_000, 0.0, 0.5);
        assert_eq!(d0, 100);
        assert_eq!(d1, 200);
        assert_eq!(d2, 400);
    }

    #[test]
    fn backoff_caps_at_max() {
        let delay = backoff_delay_ms(20, 100, 5_000, 0.0, 0.5);
        assert_eq!(delay, 5_000);
    }

    #[test]
    fn jitter_bounds() {
        // random = 0.0 → multiplier 0.8; random → 1.0 → multiplier 1.2
        assert_eq!(backoff_delay_ms(0, 1000, 60_000, 0.2, 0.0), 800);
        assert_eq!(backoff_delay_ms(0, 1000, 60_000, 0.2, 0.5), 1000);
        assert_eq!(backoff_delay_ms(0, 1000, 60_000, 0.2, 1.0), 1200);
    }

    #[test]
    fn high_attempt_does_not_overflow() {
        let delay = backoff_delay_ms(1000, 1000, 60_000, 0.2, 0.99);
        assert!(delay > 0);
        assert!(delay <= 72_000);
    }

    #[test]
    fn config_delay_uses_own_fields() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 10,
            max_delay_ms: 15,
            jitter_factor: 0.0,
        };
        assert_eq!(config.delay_ms(0, 0.5), 10);
        assert_eq!(config.delay_ms(1, 0.5), 15); // capped
    }
}

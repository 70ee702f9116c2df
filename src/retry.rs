//! Exponential backoff with jitter for the resilient fetch loop
//!
//! The delay before retry `k` is `backoff_unit * 2^k` plus up to one unit
//! of uniform jitter, capped at the policy's `max_delay`. The jitter keeps
//! many processes hammering the same rate-limited host from synchronizing.

use crate::config::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// Compute the sleep before retry number `retry_count` (zero-based).
pub fn backoff_delay(config: &RetryConfig, retry_count: u32) -> Duration {
    let unit = config.backoff_unit.as_secs_f64();
    // Exponent clamp keeps the f64 finite; the cap below governs anyway.
    let factor = 2.0_f64.powi(retry_count.min(62) as i32);
    let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
    let raw = unit * factor + unit * jitter;

    if raw >= config.max_delay.as_secs_f64() {
        config.max_delay
    } else {
        Duration::from_secs_f64(raw)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn policy(unit_ms: u64, max_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            max_attempts: 10,
            backoff_unit: Duration::from_millis(unit_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    #[test]
    fn delay_grows_as_two_to_the_k_within_jitter_bound() {
        let config = policy(100, 60_000);
        for k in 0..5_u32 {
            let base = Duration::from_millis(100 * 2_u64.pow(k));
            let ceiling = base + Duration::from_millis(100);
            for _ in 0..50 {
                let delay = backoff_delay(&config, k);
                assert!(delay >= base, "retry {k}: {delay:?} below {base:?}");
                assert!(delay <= ceiling, "retry {k}: {delay:?} above {ceiling:?}");
            }
        }
    }

    #[test]
    fn delay_is_capped_at_max_delay() {
        let config = policy(100, 500);
        let delay = backoff_delay(&config, 8);
        assert_eq!(delay, Duration::from_millis(500));
    }

    #[test]
    fn huge_retry_counts_do_not_overflow() {
        let config = policy(1000, 300_000);
        let delay = backoff_delay(&config, u32::MAX);
        assert_eq!(delay, Duration::from_millis(300_000));
    }

    #[test]
    fn jitter_produces_varied_delays() {
        let config = policy(1000, 60_000);
        let first = backoff_delay(&config, 3);
        let mut saw_different = false;
        for _ in 0..100 {
            if backoff_delay(&config, 3) != first {
                saw_different = true;
                break;
            }
        }
        assert!(saw_different, "100 draws produced identical jitter");
    }
}

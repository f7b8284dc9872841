//! Exponential backoff with full jitter.

use rand::Rng;

/// Source of uniform samples in `[0.0, 1.0)`.
pub trait JitterSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Draws from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Always returns the same sample; makes delays exact under test.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Exclusive upper bound of the delay for a zero-indexed `attempt`:
/// `base_delay_ms * 2^attempt`, saturating.
pub fn max_backoff(attempt: u32, base_delay_ms: u64) -> u64 {
    base_delay_ms.saturating_mul(2u64.saturating_pow(attempt))
}

/// Full jitter delay in milliseconds, uniform over `[0, base_delay_ms * 2^attempt)`.
pub fn calculate_backoff(attempt: u32, base_delay_ms: u64, jitter: &dyn JitterSource) -> u64 {
    let ceiling = max_backoff(attempt, base_delay_ms);
    if ceiling == 0 {
        return 0;
    }

    let sample = jitter.sample();
    let sample = if sample.is_finite() {
        sample.clamp(0.0, 1.0)
    } else {
        0.0
    };

    ((sample * ceiling as f64) as u64).min(ceiling - 1)
}

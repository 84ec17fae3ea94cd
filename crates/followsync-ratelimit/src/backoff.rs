//! Retry delays for transient failures.

use std::time::Duration;

use rand::Rng;

/// Doubling delays with optional proportional jitter, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max: Duration,
    /// Fraction in `0.0..=1.0` by which a delay may be stretched or shrunk.
    pub jitter: f64,
}

impl ExponentialBackoff {
    #[must_use]
    pub const fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            jitter: 0.0,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) };
        self
    }

    /// Delay before retry `retry` (0 for the first), ignoring jitter.
    #[must_use]
    pub fn base_delay(&self, retry: u32) -> Duration {
        let scale = 2_u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.initial.saturating_mul(scale).min(self.max)
    }

    /// Delay before retry `retry` (0 for the first).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter <= 0.0 {
            return base;
        }

        let stretch = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        base.mul_f64(1.0 + stretch).min(self.max)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60)).with_jitter(0.1)
    }
}

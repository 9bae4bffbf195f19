//! Polling configuration for long-running backend operations.

use std::time::Duration;

/// Backoff schedule used while waiting on a long-running operation.
///
/// The wait is unconditional: there is no attempt limit and no overall
/// deadline. Abort a wait by dropping it or through
/// [`RevokeOperation::wait_or_cancel`](crate::grants::RevokeOperation::wait_or_cancel).
///
/// ## Default Values
///
/// - `initial_delay`: 500ms
/// - `max_delay`: 10s
/// - `multiplier`: 1.5
/// - `jitter`: 0.1 (10%)
///
/// ## Example
///
/// ```rust
/// use pam_grants::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::new()
///     .with_initial_delay(Duration::from_millis(250))
///     .with_max_delay(Duration::from_secs(5));
/// assert_eq!(config.max_delay, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Delay before the first status poll.
    pub initial_delay: Duration,

    /// Maximum delay between polls.
    pub max_delay: Duration,

    /// Multiplier for exponential backoff.
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0) to add randomness to delays.
    pub jitter: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 1.5,
            jitter: 0.1,
        }
    }
}

impl PollConfig {
    /// Creates a new poll configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A schedule without delays, for in-memory backends and tests.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Sets the delay before the first poll.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between polls.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the exponential backoff multiplier. Values below 1.0 are raised to 1.0.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Sets the jitter factor.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Calculates the delay before poll number `attempt` (zero-based).
    ///
    /// `initial_delay * multiplier^attempt`, capped at `max_delay`, with
    /// optional jitter. Values that are not a valid duration (overflow,
    /// negative, NaN) fall back to `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let jittered = if self.jitter > 0.0 {
            let jitter_range = capped_delay * self.jitter;
            let jitter_offset = (fastrand::f64() - 0.5) * 2.0 * jitter_range;
            (capped_delay + jitter_offset).max(0.0)
        } else {
            capped_delay
        };

        Duration::try_from_secs_f64(jittered).unwrap_or(self.max_delay)
    }
}

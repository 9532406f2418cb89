use std::time::Duration;

/// Reconnect schedule for the change stream consumer.
///
/// Delays grow as `initial_delay * 2^attempt`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Consecutive failed attempts tolerated; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            initial_delay,
            max_delay: max_delay.max(initial_delay),
            max_attempts,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_until_capped() {
        let policy = ReconnectPolicy::new(
            Duration::from_millis(100),
            Duration::from_millis(1000),
            None,
        );
        let delays: Vec<u64> = (0..6)
            .map(|n| policy.delay_for(n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(1000));
    }

    #[test]
    fn test_exhaustion() {
        assert!(!ReconnectPolicy::default().exhausted(u32::MAX));

        let bounded = ReconnectPolicy::new(Duration::ZERO, Duration::ZERO, Some(3));
        assert!(!bounded.exhausted(2));
        assert!(bounded.exhausted(3));
    }

    #[test]
    fn test_max_delay_never_below_initial() {
        let policy = ReconnectPolicy::new(Duration::from_secs(5), Duration::from_secs(1), None);
        assert_eq!(policy.delay_for(0), Duration::from_secs(5));
    }
}

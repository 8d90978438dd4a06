//! Round timer.

use std::time::Duration;

/// Expiry window of a single round.
///
/// Holds no state beyond the round start and the configured duration; `now`
/// always comes from the settlement layer's clock, never from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimer {
    started_at: Duration,
    duration: Duration,
}

impl RoundTimer {
    /// Create a timer for a round started at `started_at`.
    pub fn new(started_at: Duration, duration: Duration) -> Self {
        Self {
            started_at,
            duration,
        }
    }

    /// When the round started.
    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// First instant at which the round counts as expired.
    pub fn deadline(&self) -> Duration {
        self.started_at.saturating_add(self.duration)
    }

    /// Whether the response window has closed.
    ///
    /// The window is half-open: a response at `now < deadline` is in time, and
    /// the round may be settled from `now >= deadline` onwards.
    pub fn is_expired(&self, now: Duration) -> bool {
        now >= self.deadline()
    }

    /// Time left in the window, zero once expired.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.deadline().saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_half_open() {
        let timer = RoundTimer::new(Duration::from_secs(10), Duration::from_secs(1));

        assert_eq!(timer.deadline(), Duration::from_secs(11));
        assert!(!timer.is_expired(Duration::from_secs(10)));
        assert!(!timer.is_expired(Duration::from_millis(10_999)));
        assert!(timer.is_expired(Duration::from_secs(11)));
        assert!(timer.is_expired(Duration::from_secs(12)));
    }

    #[test]
    fn test_remaining() {
        let timer = RoundTimer::new(Duration::from_secs(10), Duration::from_secs(1));

        assert_eq!(
            timer.remaining(Duration::from_millis(10_250)),
            Duration::from_millis(750)
        );
        assert_eq!(timer.remaining(Duration::from_secs(20)), Duration::ZERO);
    }

    #[test]
    fn test_deadline_saturates() {
        let timer = RoundTimer::new(Duration::MAX, Duration::from_secs(1));
        assert_eq!(timer.deadline(), Duration::MAX);
    }
}

// Availability tracking
//
// Consecutive-failure counting, deliberately decoupled from the gate
// state: losing connectivity freezes the last observed state instead of
// clearing it, so a flaky upstream does not flicker the UI.

use tracing::{info, warn};

/// Consecutive failures before the device is marked unavailable.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Stateful success/failure counter with a derived availability flag.
///
/// Starts unavailable: the device has not been observed yet.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityTracker {
    consecutive_failures: u32,
    available: bool,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed poll or command.
    ///
    /// Flips the availability flag once the failure streak reaches
    /// [`MAX_CONSECUTIVE_FAILURES`]. Never touches the gate state.
    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;

        if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            warn!(
                failures = self.consecutive_failures,
                "marking device unavailable after consecutive failures; \
                 will retry on next update cycle"
            );
            self.available = false;
        }
    }

    /// Record a successful exchange with the device.
    pub fn record_success(&mut self) {
        if self.consecutive_failures > 0 {
            info!(
                failures = self.consecutive_failures,
                "device recovered after failures"
            );
        }
        self.consecutive_failures = 0;
        self.available = true;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unavailable() {
        let tracker = AvailabilityTracker::new();
        assert!(!tracker.is_available());
        assert_eq!(tracker.consecutive_failures(), 0);
    }

    #[test]
    fn flips_unavailable_exactly_on_fifth_failure() {
        let mut tracker = AvailabilityTracker::new();
        tracker.record_success();

        for expected in 1..MAX_CONSECUTIVE_FAILURES {
            tracker.record_failure();
            assert_eq!(tracker.consecutive_failures(), expected);
            assert!(tracker.is_available(), "flipped early at {expected}");
        }

        tracker.record_failure();
        assert_eq!(tracker.consecutive_failures(), MAX_CONSECUTIVE_FAILURES);
        assert!(!tracker.is_available());
    }

    #[test]
    fn success_resets_streak_without_flipping_unavailable() {
        let mut tracker = AvailabilityTracker::new();
        tracker.record_success();

        for _ in 0..4 {
            tracker.record_failure();
        }
        assert!(tracker.is_available());

        tracker.record_success();
        assert_eq!(tracker.consecutive_failures(), 0);
        assert!(tracker.is_available());

        // The streak starts over after a reset.
        for _ in 0..4 {
            tracker.record_failure();
        }
        assert!(tracker.is_available());
    }

    #[test]
    fn success_recovers_an_unavailable_device() {
        let mut tracker = AvailabilityTracker::new();
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            tracker.record_failure();
        }
        assert!(!tracker.is_available());

        tracker.record_success();
        assert!(tracker.is_available());
        assert_eq!(tracker.consecutive_failures(), 0);
    }
}

//! Full-screen "rep counted" flash.

use std::time::{Duration, Instant};

/// How long the flash stays up
pub const PULSE_DURATION: Duration = Duration::from_millis(800);

/// Fire-and-forget overlay flag
///
/// Firing while already visible restarts the window; nothing is queued.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeedbackPulse {
    until: Option<Instant>,
}

impl FeedbackPulse {
    pub fn fire(&mut self, now: Instant) {
        self.until = Some(now + PULSE_DURATION);
    }

    pub fn is_visible(&self) -> bool {
        self.until.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.until
    }

    /// Clear the flag if its window has passed; returns true when it cleared
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_expires() {
        let t0 = Instant::now();
        let mut pulse = FeedbackPulse::default();
        assert!(!pulse.is_visible());

        pulse.fire(t0);
        assert!(pulse.is_visible());
        assert!(!pulse.expire(t0 + Duration::from_millis(799)));
        assert!(pulse.expire(t0 + PULSE_DURATION));
        assert!(!pulse.is_visible());
        assert!(!pulse.expire(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_refire_restarts_window() {
        let t0 = Instant::now();
        let mut pulse = FeedbackPulse::default();

        pulse.fire(t0);
        pulse.fire(t0 + Duration::from_millis(500));

        assert!(!pulse.expire(t0 + Duration::from_millis(900)));
        assert!(pulse.is_visible());
        assert!(pulse.expire(t0 + Duration::from_millis(1300)));
    }
}

//! Pre-session countdown.
//!
//! Shows 3, 2, 1 one second apart, then "Go!" for [`START_DELAY`] before the
//! session starts. Time is the caller's monotonic clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// First number shown
pub const COUNTDOWN_SECONDS: u8 = 3;

/// Interval between countdown numbers
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How long "Go!" stays up before the session starts
pub const START_DELAY: Duration = Duration::from_millis(800);

/// What the countdown screen shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownDisplay {
    Seconds(u8),
    Go,
}

impl fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownDisplay::Seconds(n) => write!(f, "{}", n),
            CountdownDisplay::Go => f.write_str("Go!"),
        }
    }
}

/// One step reached while advancing the countdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStep {
    Show(CountdownDisplay),
    Finished,
}

/// A running countdown
#[derive(Clone, Debug)]
pub struct Countdown {
    display: CountdownDisplay,
    next_at: Instant,
    finished: bool,
}

impl Countdown {
    /// Start counting down; the first number is shown immediately
    pub fn start(now: Instant) -> Self {
        Self {
            display: CountdownDisplay::Seconds(COUNTDOWN_SECONDS),
            next_at: now + TICK_INTERVAL,
            finished: false,
        }
    }

    pub fn display(&self) -> CountdownDisplay {
        self.display
    }

    /// When the next step is due, or None once finished
    pub fn deadline(&self) -> Option<Instant> {
        (!self.finished).then_some(self.next_at)
    }

    /// Advance to `now`, returning every step reached in order
    ///
    /// A late call catches up on all missed ticks.
    pub fn advance(&mut self, now: Instant) -> Vec<CountdownStep> {
        let mut steps = Vec::new();

        while !self.finished && now >= self.next_at {
            match self.display {
                CountdownDisplay::Seconds(n) if n > 1 => {
                    self.display = CountdownDisplay::Seconds(n - 1);
                    self.next_at += TICK_INTERVAL;
                    steps.push(CountdownStep::Show(self.display));
                }
                CountdownDisplay::Seconds(_) => {
                    self.display = CountdownDisplay::Go;
                    self.next_at += START_DELAY;
                    steps.push(CountdownStep::Show(self.display));
                }
                CountdownDisplay::Go => {
                    self.finished = true;
                    steps.push(CountdownStep::Finished);
                }
            }
        }

        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_once_per_second() {
        let t0 = Instant::now();
        let mut countdown = Countdown::start(t0);
        assert_eq!(countdown.display(), CountdownDisplay::Seconds(3));

        assert!(countdown.advance(t0 + Duration::from_millis(999)).is_empty());
        assert_eq!(
            countdown.advance(t0 + Duration::from_secs(1)),
            vec![CountdownStep::Show(CountdownDisplay::Seconds(2))]
        );
        assert_eq!(
            countdown.advance(t0 + Duration::from_secs(2)),
            vec![CountdownStep::Show(CountdownDisplay::Seconds(1))]
        );
        assert_eq!(
            countdown.advance(t0 + Duration::from_secs(3)),
            vec![CountdownStep::Show(CountdownDisplay::Go)]
        );
        assert!(countdown.advance(t0 + Duration::from_millis(3700)).is_empty());
        assert_eq!(
            countdown.advance(t0 + Duration::from_millis(3800)),
            vec![CountdownStep::Finished]
        );
        assert_eq!(countdown.deadline(), None);
    }

    #[test]
    fn test_late_advance_catches_up() {
        let t0 = Instant::now();
        let mut countdown = Countdown::start(t0);

        let steps = countdown.advance(t0 + Duration::from_secs(10));
        assert_eq!(
            steps,
            vec![
                CountdownStep::Show(CountdownDisplay::Seconds(2)),
                CountdownStep::Show(CountdownDisplay::Seconds(1)),
                CountdownStep::Show(CountdownDisplay::Go),
                CountdownStep::Finished,
            ]
        );
        assert!(countdown.advance(t0 + Duration::from_secs(20)).is_empty());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CountdownDisplay::Seconds(3).to_string(), "3");
        assert_eq!(CountdownDisplay::Go.to_string(), "Go!");
    }
}

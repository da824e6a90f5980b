//! Screen sequencer for a guided exercise session.
//!
//! The flow is intro → menu → calibration → countdown → session → done,
//! with "Back" returning to the menu from any camera screen. Button taps
//! are explicit calls; the remaining transitions are driven by landmark
//! frames ([`Trainer::handle_frame`]) and timers ([`Trainer::tick`]).
//!
//! Everything runs on the caller's thread. Timers are deadlines on the
//! caller's monotonic clock, and every started exercise gets a fresh
//! [`SessionKey`] so frames subscribed for an earlier session are dropped.

use crate::calibration;
use crate::classifier::{self, RepState};
use crate::countdown::{Countdown, CountdownDisplay, CountdownStep};
use crate::feedback::FeedbackPulse;
use crate::{
    Error, Exercise, Joints, PoseFrame, Result, Screen, SessionKey, SessionSummary,
    TrackingOptions, TARGET_REPS,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Pause between the final rep and the done screen
pub const COMPLETION_DELAY: Duration = Duration::from_millis(800);

/// Observable changes, drained with [`Trainer::take_events`]
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrainerEvent {
    ScreenChanged { from: Screen, to: Screen },
    Calibrated,
    Countdown { display: CountdownDisplay },
    RepCounted { count: u32 },
    TargetReached,
    FeedbackCleared,
    Completed { summary: SessionSummary },
}

/// Per-exercise state, dropped on "Back" and on completion
#[derive(Debug)]
struct ActiveSession {
    key: SessionKey,
    exercise: Exercise,
    calibrated: bool,
    countdown: Option<Countdown>,
    started_at: Option<DateTime<Utc>>,
    rep_state: RepState,
    reps: u32,
    completion_at: Option<Instant>,
    pulse: FeedbackPulse,
    last_joints: Option<Joints>,
}

impl ActiveSession {
    fn new(exercise: Exercise) -> Self {
        Self {
            key: SessionKey::new(),
            exercise,
            calibrated: false,
            countdown: None,
            started_at: None,
            rep_state: RepState::default(),
            reps: 0,
            completion_at: None,
            pulse: FeedbackPulse::default(),
            last_joints: None,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        [
            self.pulse.deadline(),
            self.countdown.as_ref().and_then(Countdown::deadline),
            self.completion_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

/// Headless state machine behind the exercise screens
#[derive(Debug)]
pub struct Trainer {
    screen: Screen,
    tracking: TrackingOptions,
    active: Option<ActiveSession>,
    last_summary: Option<SessionSummary>,
    events: Vec<TrainerEvent>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrackingOptions::default())
    }
}

impl Trainer {
    pub fn new(tracking: TrackingOptions) -> Self {
        Self {
            screen: Screen::Intro,
            tracking,
            active: None,
            last_summary: None,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // User actions
    // ========================================================================

    /// "Welcome" on the intro screen
    pub fn welcome(&mut self) -> Result<()> {
        self.require(&[Screen::Intro], "continue to the menu")?;
        self.set_screen(Screen::Menu);
        Ok(())
    }

    /// Pick an exercise from the menu and move to calibration
    ///
    /// Resets the rep counter and edge state. The returned key must
    /// accompany every frame for this session; the detector should be
    /// started with [`Trainer::tracking`].
    pub fn select_exercise(&mut self, exercise: Exercise) -> Result<SessionKey> {
        self.require(&[Screen::Menu, Screen::Done], "select an exercise")?;

        let session = ActiveSession::new(exercise);
        let key = session.key;
        tracing::info!("Starting {} (session {})", exercise, key);

        self.active = Some(session);
        self.set_screen(Screen::Calibration);
        Ok(key)
    }

    /// "Back" / "Back to Menu"
    ///
    /// Cancels any running countdown and pending delays, and invalidates
    /// the current session key.
    pub fn back_to_menu(&mut self) -> Result<()> {
        self.require(
            &[
                Screen::Calibration,
                Screen::Countdown,
                Screen::Session,
                Screen::Done,
            ],
            "go back to the menu",
        )?;

        if let Some(session) = self.active.take() {
            tracing::info!(
                "Abandoning {} at {} reps (session {})",
                session.exercise,
                session.reps,
                session.key
            );
        }
        self.set_screen(Screen::Menu);
        Ok(())
    }

    // ========================================================================
    // Frames and timers
    // ========================================================================

    /// React to one landmark frame
    ///
    /// Frames for another session, sparse or malformed frames, and frames
    /// arriving on screens that do not read landmarks are ignored.
    pub fn handle_frame(&mut self, key: SessionKey, frame: &PoseFrame, now: Instant) {
        self.tick(now);

        let screen = self.screen;
        let Some(session) = self.active.as_mut() else {
            tracing::debug!("Ignoring frame with no active session");
            return;
        };
        if session.key != key {
            tracing::debug!("Ignoring stale frame for session {}", key);
            return;
        }
        let Some(joints) = Joints::from_frame(frame) else {
            tracing::debug!(
                "Ignoring frame with {} unusable landmarks",
                frame.landmarks.len()
            );
            return;
        };
        session.last_joints = Some(joints);

        match screen {
            Screen::Calibration => self.calibrate(&joints, now),
            Screen::Session => self.count(&joints, now),
            _ => {}
        }
    }

    /// Fire every timer due at or before `now`
    pub fn tick(&mut self, now: Instant) {
        let Some(session) = self.active.as_mut() else {
            return;
        };

        if session.pulse.expire(now) {
            self.events.push(TrainerEvent::FeedbackCleared);
        }

        let steps = session
            .countdown
            .as_mut()
            .map(|c| c.advance(now))
            .unwrap_or_default();
        for step in steps {
            match step {
                CountdownStep::Show(shown) => {
                    tracing::debug!("Countdown: {}", shown);
                    self.events.push(TrainerEvent::Countdown { display: shown });
                }
                CountdownStep::Finished => self.start_session(),
            }
        }

        let completion_due = self
            .active
            .as_ref()
            .and_then(|s| s.completion_at)
            .is_some_and(|at| now >= at);
        if completion_due {
            self.complete();
        }
    }

    /// Earliest pending timer, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(ActiveSession::next_deadline)
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<TrainerEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn tracking(&self) -> &TrackingOptions {
        &self.tracking
    }

    pub fn active_key(&self) -> Option<SessionKey> {
        self.active.as_ref().map(|s| s.key)
    }

    /// Exercise in progress, or the one just completed on the done screen
    pub fn exercise(&self) -> Option<Exercise> {
        match (&self.active, self.screen) {
            (Some(session), _) => Some(session.exercise),
            (None, Screen::Done) => self.last_summary.as_ref().map(|s| s.exercise),
            _ => None,
        }
    }

    pub fn rep_count(&self) -> u32 {
        match (&self.active, self.screen) {
            (Some(session), _) => session.reps,
            (None, Screen::Done) => self.last_summary.as_ref().map_or(0, |s| s.reps),
            _ => 0,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.calibrated)
    }

    pub fn countdown_display(&self) -> Option<CountdownDisplay> {
        self.active
            .as_ref()
            .and_then(|s| s.countdown.as_ref())
            .map(Countdown::display)
    }

    /// Whether the "rep counted" flash is showing
    pub fn feedback_visible(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.pulse.is_visible())
    }

    /// Joints from the last accepted frame of the active session
    pub fn last_joints(&self) -> Option<&Joints> {
        self.active.as_ref().and_then(|s| s.last_joints.as_ref())
    }

    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Rep counter line, e.g. "Squats: 3 / 10"
    pub fn counter_text(&self) -> Option<String> {
        self.exercise()
            .map(|e| format!("{}: {} / {}", e.label(), self.rep_count(), TARGET_REPS))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require(&self, allowed: &[Screen], action: &'static str) -> Result<()> {
        if allowed.contains(&self.screen) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.screen,
                action,
            })
        }
    }

    fn set_screen(&mut self, to: Screen) {
        let from = std::mem::replace(&mut self.screen, to);
        tracing::info!("Screen: {} -> {}", from, to);
        self.events.push(TrainerEvent::ScreenChanged { from, to });
    }

    fn calibrate(&mut self, joints: &Joints, now: Instant) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        if session.calibrated || !calibration::in_position(joints) {
            return;
        }

        session.calibrated = true;
        let countdown = Countdown::start(now);
        let display = countdown.display();
        session.countdown = Some(countdown);
        tracing::info!("Calibrated, starting countdown");

        self.events.push(TrainerEvent::Calibrated);
        self.set_screen(Screen::Countdown);
        self.events.push(TrainerEvent::Countdown { display });
    }

    fn start_session(&mut self) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        session.countdown = None;
        session.rep_state = RepState::default();
        session.reps = 0;
        session.pulse.clear();
        session.started_at = Some(Utc::now());
        self.set_screen(Screen::Session);
    }

    fn count(&mut self, joints: &Joints, now: Instant) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        // Frames after the target are not counted
        if session.reps >= TARGET_REPS {
            return;
        }

        let result = classifier::classify(session.exercise, joints, session.rep_state);
        session.rep_state = result.state;
        if result.reps == 0 {
            return;
        }

        session.reps = (session.reps + result.reps).min(TARGET_REPS);
        session.pulse.fire(now);
        tracing::debug!("{} rep {}", session.exercise, session.reps);
        self.events.push(TrainerEvent::RepCounted {
            count: session.reps,
        });

        if session.reps >= TARGET_REPS && session.completion_at.is_none() {
            session.completion_at = Some(now + COMPLETION_DELAY);
            tracing::info!("Reached {} reps", TARGET_REPS);
            self.events.push(TrainerEvent::TargetReached);
        }
    }

    fn complete(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };
        let completed_at = Utc::now();
        let summary = SessionSummary {
            key: session.key,
            exercise: session.exercise,
            reps: session.reps,
            started_at: session.started_at.unwrap_or(completed_at),
            completed_at,
        };

        self.set_screen(Screen::Done);
        self.events.push(TrainerEvent::Completed {
            summary: summary.clone(),
        });
        self.last_summary = Some(summary);
    }
}

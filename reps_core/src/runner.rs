//! Drives a [`Trainer`] from a [`PoseSource`].
//!
//! Stands in for the UI's event loop: taps through the intro and menu,
//! starts the detector, then delivers frames at a fixed rate on a simulated
//! clock, ticking timers before every frame.

use crate::trainer::{Trainer, TrainerEvent};
use crate::{Error, Exercise, PoseSource, Result, Screen, SessionSummary};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Outcome of one replayed session
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub exercise: Exercise,
    pub final_screen: Screen,
    pub reps: u32,
    pub frames: usize,
    pub summary: Option<SessionSummary>,
    pub events: Vec<TrainerEvent>,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        self.final_screen == Screen::Done
    }
}

/// Replays frames through a full session at a fixed frame rate
pub struct SessionRunner {
    trainer: Trainer,
    frame_interval: Duration,
}

impl SessionRunner {
    pub fn new(trainer: Trainer, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(Error::Config("frame rate must be at least 1 fps".into()));
        }
        Ok(Self {
            trainer,
            frame_interval: Duration::from_secs(1) / fps,
        })
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// Run one exercise to completion or until the source runs dry
    ///
    /// `on_event` sees every event as it happens.
    pub fn run<S, F>(&mut self, exercise: Exercise, source: &mut S, mut on_event: F) -> Result<RunReport>
    where
        S: PoseSource + ?Sized,
        F: FnMut(&Trainer, &TrainerEvent),
    {
        let mut events = Vec::new();

        match self.trainer.screen() {
            Screen::Intro => self.trainer.welcome()?,
            screen if screen.is_active() => self.trainer.back_to_menu()?,
            _ => {}
        }
        let key = self.trainer.select_exercise(exercise)?;
        self.drain(&mut events, &mut on_event);

        source.start(self.trainer.tracking())?;

        let t0 = Instant::now();
        let mut now = t0;
        let mut frames = 0usize;

        while let Some(frame) = source.next_frame()? {
            now = t0 + self.frame_interval * (frames as u32);
            frames += 1;

            self.trainer.tick(now);
            self.trainer.handle_frame(key, &frame, now);
            self.drain(&mut events, &mut on_event);

            if self.trainer.screen() == Screen::Done {
                break;
            }
        }

        // Let pending delays (countdown, completion) play out
        while let Some(deadline) = self.trainer.next_deadline() {
            now = now.max(deadline);
            self.trainer.tick(now);
            self.drain(&mut events, &mut on_event);
        }

        tracing::info!(
            "Replayed {} frames: {} on {} screen",
            frames,
            self.trainer.counter_text().unwrap_or_default(),
            self.trainer.screen()
        );

        Ok(RunReport {
            exercise,
            final_screen: self.trainer.screen(),
            reps: self.trainer.rep_count(),
            frames,
            summary: if self.trainer.screen() == Screen::Done {
                self.trainer.last_summary().cloned()
            } else {
                None
            },
            events,
        })
    }

    fn drain<F>(&mut self, events: &mut Vec<TrainerEvent>, on_event: &mut F)
    where
        F: FnMut(&Trainer, &TrainerEvent),
    {
        for event in self.trainer.take_events() {
            on_event(&self.trainer, &event);
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::ScriptedSource;
    use crate::{synthetic, TrackingOptions};

    fn run(exercise: Exercise, frames: Vec<crate::PoseFrame>) -> RunReport {
        let mut runner = SessionRunner::new(Trainer::default(), 30).unwrap();
        let mut source = ScriptedSource::new(frames);
        runner.run(exercise, &mut source, |_, _| {}).unwrap()
    }

    #[test]
    fn test_full_session_completes() {
        for exercise in Exercise::ALL {
            let report = run(exercise, synthetic::recording(exercise, 10, 30));
            assert!(report.completed(), "{} did not complete", exercise);
            assert_eq!(report.reps, 10);
            assert_eq!(report.summary.as_ref().unwrap().exercise, exercise);
        }
    }

    #[test]
    fn test_extra_reps_do_not_recomplete() {
        let report = run(
            Exercise::Squats,
            synthetic::recording(Exercise::Squats, 14, 30),
        );
        assert!(report.completed());
        assert_eq!(report.reps, 10);

        let completions = report
            .events
            .iter()
            .filter(|e| matches!(e, TrainerEvent::Completed { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_short_recording_stops_in_session() {
        let report = run(
            Exercise::Lunges,
            synthetic::recording(Exercise::Lunges, 4, 30),
        );
        assert!(!report.completed());
        assert_eq!(report.final_screen, Screen::Session);
        assert_eq!(report.reps, 4);
        assert!(report.summary.is_none());
    }

    #[test]
    fn test_recording_without_lead_in_loses_reps() {
        // Reps performed during the countdown are not counted
        let mut frames = vec![synthetic::standing()];
        for i in 0..5 {
            frames.extend(synthetic::rep_cycle(Exercise::CalfRaises, i));
        }
        let report = run(Exercise::CalfRaises, frames);
        assert_eq!(report.final_screen, Screen::Session);
        assert_eq!(report.reps, 0);
    }

    #[test]
    fn test_never_calibrated_stays_on_calibration() {
        let mut off_screen = synthetic::standing();
        for lm in off_screen.landmarks.iter_mut() {
            lm.y = 0.05;
        }
        let report = run(Exercise::Squats, vec![off_screen; 60]);
        assert_eq!(report.final_screen, Screen::Calibration);
        assert!(report
            .events
            .iter()
            .all(|e| !matches!(e, TrainerEvent::Calibrated)));
    }

    #[test]
    fn test_detector_started_with_tracking_options() {
        let mut tracking = TrackingOptions::default();
        tracking.width = 720;
        let mut runner = SessionRunner::new(Trainer::new(tracking.clone()), 30).unwrap();
        let mut source = ScriptedSource::new(Vec::new());

        runner.run(Exercise::Squats, &mut source, |_, _| {}).unwrap();
        assert_eq!(source.started_with(), Some(&tracking));
    }

    #[test]
    fn test_runner_is_reusable() {
        let mut runner = SessionRunner::new(Trainer::default(), 30).unwrap();

        let mut first = ScriptedSource::new(synthetic::recording(Exercise::HighKnees, 10, 30));
        let report = runner.run(Exercise::HighKnees, &mut first, |_, _| {}).unwrap();
        assert!(report.completed());

        let mut second = ScriptedSource::new(synthetic::recording(Exercise::OneLegSquat, 3, 30));
        let report = runner.run(Exercise::OneLegSquat, &mut second, |_, _| {}).unwrap();
        assert_eq!(report.reps, 3);
        assert_eq!(runner.trainer().exercise(), Some(Exercise::OneLegSquat));
    }

    #[test]
    fn test_zero_fps_rejected() {
        assert!(SessionRunner::new(Trainer::default(), 0).is_err());
    }

    #[test]
    fn test_events_reach_callback_in_order() {
        let mut runner = SessionRunner::new(Trainer::default(), 30).unwrap();
        let mut source = ScriptedSource::new(synthetic::recording(Exercise::Squats, 2, 30));
        let mut counts = Vec::new();

        runner
            .run(Exercise::Squats, &mut source, |trainer, event| {
                if let TrainerEvent::RepCounted { count } = event {
                    assert_eq!(trainer.rep_count(), *count);
                    counts.push(*count);
                }
            })
            .unwrap();
        assert_eq!(counts, vec![1, 2]);
    }
}

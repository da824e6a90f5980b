//! Synthetic landmark frames.
//!
//! Produces poses that sit inside the calibration box and rep cycles that
//! cross each exercise's thresholds exactly once, for tests and for
//! `reptrack synth`.

use crate::countdown::{COUNTDOWN_SECONDS, START_DELAY, TICK_INTERVAL};
use crate::{BodyPart, Exercise, Landmark, PoseFrame};

/// Landmarks per frame, matching the detector's full-body model
pub const LANDMARK_COUNT: usize = 33;

const SHOULDER_Y: f32 = 0.35;
const HIP_Y: f32 = 0.55;
const KNEE_Y: f32 = 0.7;
const ANKLE_Y: f32 = 0.85;

/// Upright, facing the camera, inside the calibration box
pub fn standing() -> PoseFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.2, 0.0); LANDMARK_COUNT];
    let mut set = |part: BodyPart, x: f32, y: f32| {
        landmarks[part.index()] = Landmark::new(x, y, 0.0);
    };

    set(BodyPart::LeftShoulder, 0.42, SHOULDER_Y);
    set(BodyPart::RightShoulder, 0.58, SHOULDER_Y);
    set(BodyPart::LeftHip, 0.45, HIP_Y);
    set(BodyPart::RightHip, 0.55, HIP_Y);
    set(BodyPart::LeftKnee, 0.45, KNEE_Y);
    set(BodyPart::RightKnee, 0.55, KNEE_Y);
    set(BodyPart::LeftAnkle, 0.45, ANKLE_Y);
    set(BodyPart::RightAnkle, 0.55, ANKLE_Y);

    PoseFrame::new(landmarks)
}

/// Postures for one rep, ending back in [`standing`]
///
/// `index` alternates the working leg for high knees.
pub fn rep_cycle(exercise: Exercise, index: usize) -> Vec<PoseFrame> {
    match exercise {
        Exercise::HighKnees => {
            let knee = if index % 2 == 0 {
                BodyPart::LeftKnee
            } else {
                BodyPart::RightKnee
            };
            vec![with(standing(), &[(knee, HIP_Y - 0.1)]), standing()]
        }
        Exercise::Squats => {
            let deep = with(
                standing(),
                &[
                    (BodyPart::LeftShoulder, 0.5),
                    (BodyPart::RightShoulder, 0.5),
                    (BodyPart::LeftHip, KNEE_Y + 0.05),
                    (BodyPart::RightHip, KNEE_Y + 0.05),
                ],
            );
            vec![deep, standing()]
        }
        Exercise::Lunges => {
            let mut lunge = standing();
            lunge.landmarks[BodyPart::RightKnee.index()].z = 0.3;
            vec![lunge, standing()]
        }
        Exercise::CalfRaises => {
            let raised = with(
                standing(),
                &[(BodyPart::LeftAnkle, 0.45), (BodyPart::RightAnkle, 0.45)],
            );
            vec![raised, standing()]
        }
        Exercise::OneLegSquat => {
            let lifted = with(standing(), &[(BodyPart::LeftAnkle, KNEE_Y - 0.1)]);
            let down = with(lifted.clone(), &[(BodyPart::RightHip, KNEE_Y + 0.05)]);
            vec![lifted.clone(), down, lifted, standing()]
        }
    }
}

/// A full session recording at `fps`
///
/// Calibration hold, enough standing frames to cover the countdown, then
/// `reps` rep cycles with every posture held for about 100ms.
pub fn recording(exercise: Exercise, reps: usize, fps: u32) -> Vec<PoseFrame> {
    let hold = (fps as usize / 10).max(1);
    let lead_in = TICK_INTERVAL * u32::from(COUNTDOWN_SECONDS) + START_DELAY;
    let lead_in_ms = lead_in.as_millis() as usize;
    let lead_in_frames = (lead_in_ms * fps as usize).div_ceil(1000) + 1;

    let mut frames = vec![standing(); hold + lead_in_frames];
    for i in 0..reps {
        for posture in rep_cycle(exercise, i) {
            frames.extend(std::iter::repeat(posture).take(hold));
        }
    }
    frames.extend(std::iter::repeat(standing()).take(hold));
    frames
}

fn with(mut frame: PoseFrame, ys: &[(BodyPart, f32)]) -> PoseFrame {
    for &(part, y) in ys {
        frame.landmarks[part.index()].y = y;
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration;
    use crate::classifier::{classify, RepState};
    use crate::Joints;

    #[test]
    fn test_standing_calibrates() {
        let frame = standing();
        assert_eq!(frame.landmarks.len(), LANDMARK_COUNT);
        assert!(calibration::in_position(&Joints::from_frame(&frame).unwrap()));
    }

    #[test]
    fn test_each_cycle_is_one_rep() {
        for exercise in Exercise::ALL {
            for index in 0..2 {
                let mut state = RepState::default();
                let mut reps = 0;
                for frame in rep_cycle(exercise, index) {
                    let result = classify(exercise, &Joints::from_frame(&frame).unwrap(), state);
                    state = result.state;
                    reps += result.reps;
                }
                assert_eq!(reps, 1, "{} cycle {}", exercise, index);
                assert_eq!(state, RepState::default(), "{} left armed", exercise);
            }
        }
    }

    #[test]
    fn test_recording_length() {
        // 3 calibration + 115 lead-in + 5 reps * 2 postures * 3 + 3 tail
        assert_eq!(recording(Exercise::Squats, 5, 30).len(), 3 + 115 + 30 + 3);
        assert_eq!(recording(Exercise::Lunges, 0, 5).len(), 1 + 20 + 1);
    }
}

//! Per-exercise rep classification.
//!
//! Each exercise is an edge-triggered rule over a handful of joint
//! coordinates: a rep is counted on a state transition, never while a
//! posture is merely held. `y` grows downward, so "above" means a smaller
//! `y`.
//!
//! Rules:
//! - **High knees**: each leg separately, counted when the knee rises above
//!   its hip.
//! - **Squats**: counted when both hips drop below both knees.
//! - **Lunges**: counted when the knee depth gap closes after opening past
//!   the entry threshold.
//! - **Calf raises**: counted when the average ankle height rises past the
//!   raise threshold; re-armed only once the heels settle back past the
//!   exit threshold.
//! - **One-leg squat**: counted on rising out of a right-leg squat while the
//!   left foot is still lifted.

use crate::types::{Exercise, Joints};
use serde::{Deserialize, Serialize};

/// Knee depth gap (right minus left) that enters a lunge
pub const LUNGE_ENTER_Z: f32 = 0.2;
/// Knee depth gap below which a lunge is finished and counted
pub const LUNGE_EXIT_Z: f32 = 0.05;
/// Average ankle `y` below which a calf raise is counted
pub const CALF_RAISE_ENTER_Y: f32 = 0.5;
/// Average ankle `y` above which the calf raise re-arms
pub const CALF_RAISE_EXIT_Y: f32 = 0.55;
/// How far above its knee the free ankle must be held in a one-leg squat
pub const LIFTED_LEG_MARGIN: f32 = 0.02;

/// Edge-detection state for all rules
///
/// Only the fields of the active exercise change during a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepState {
    pub left_up: bool,
    pub right_up: bool,
    pub squatting: bool,
    pub lunging: bool,
    pub raising: bool,
    pub one_leg_squatting: bool,
}

/// Outcome of classifying one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub state: RepState,
    /// Reps completed by this frame; only high knees can yield 2
    pub reps: u32,
}

/// Classify one frame for the given exercise
pub fn classify(exercise: Exercise, joints: &Joints, prev: RepState) -> Classification {
    let mut state = prev;
    let reps = match exercise {
        Exercise::HighKnees => high_knees(joints, &mut state),
        Exercise::Squats => squats(joints, &mut state),
        Exercise::Lunges => lunges(joints, &mut state),
        Exercise::CalfRaises => calf_raises(joints, &mut state),
        Exercise::OneLegSquat => one_leg_squat(joints, &mut state),
    };
    Classification { state, reps }
}

fn high_knees(j: &Joints, state: &mut RepState) -> u32 {
    let left = knee_raise(j.left_knee.y, j.left_hip.y, &mut state.left_up);
    let right = knee_raise(j.right_knee.y, j.right_hip.y, &mut state.right_up);
    left + right
}

fn knee_raise(knee_y: f32, hip_y: f32, up: &mut bool) -> u32 {
    if knee_y < hip_y {
        if !*up {
            *up = true;
            return 1;
        }
    } else {
        *up = false;
    }
    0
}

fn squats(j: &Joints, state: &mut RepState) -> u32 {
    let both_below = j.left_hip.y > j.left_knee.y && j.right_hip.y > j.right_knee.y;
    let both_above = j.left_hip.y <= j.left_knee.y && j.right_hip.y <= j.right_knee.y;

    if both_below && !state.squatting {
        state.squatting = true;
        1
    } else {
        // One hip down and one up keeps the current state
        if both_above {
            state.squatting = false;
        }
        0
    }
}

fn lunges(j: &Joints, state: &mut RepState) -> u32 {
    let z_diff = j.right_knee.z - j.left_knee.z;

    if z_diff > LUNGE_ENTER_Z && !state.lunging {
        state.lunging = true;
        0
    } else if z_diff < LUNGE_EXIT_Z && state.lunging {
        state.lunging = false;
        1
    } else {
        0
    }
}

fn calf_raises(j: &Joints, state: &mut RepState) -> u32 {
    let avg_ankle_y = (j.left_ankle.y + j.right_ankle.y) / 2.0;

    if !state.raising && avg_ankle_y < CALF_RAISE_ENTER_Y {
        state.raising = true;
        1
    } else {
        if state.raising && avg_ankle_y > CALF_RAISE_EXIT_Y {
            state.raising = false;
        }
        0
    }
}

fn one_leg_squat(j: &Joints, state: &mut RepState) -> u32 {
    let hip_below_knee = j.right_hip.y > j.right_knee.y;
    let leg_lifted = j.left_ankle.y < j.left_knee.y - LIFTED_LEG_MARGIN;

    if hip_below_knee && leg_lifted && !state.one_leg_squatting {
        state.one_leg_squatting = true;
        0
    } else if !hip_below_knee && leg_lifted && state.one_leg_squatting {
        state.one_leg_squatting = false;
        1
    } else {
        0
    }
}

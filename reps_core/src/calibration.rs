//! Calibration check gating the countdown.
//!
//! The user is in position when both shoulders and both ankles sit inside
//! fixed vertical bands of the normalized frame.

use crate::types::Joints;

/// Open interval of normalized `y` values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Strict containment; a value on either edge is outside
    pub fn contains(&self, y: f32) -> bool {
        y > self.min && y < self.max
    }
}

/// Band both shoulders must fall in
pub const SHOULDER_BAND: Band = Band::new(0.2, 0.6);

/// Band both ankles must fall in
pub const ANKLE_BAND: Band = Band::new(0.5, 0.9);

/// Whether upper and lower body are both inside the guide box
pub fn in_position(joints: &Joints) -> bool {
    SHOULDER_BAND.contains(joints.left_shoulder.y)
        && SHOULDER_BAND.contains(joints.right_shoulder.y)
        && ANKLE_BAND.contains(joints.left_ankle.y)
        && ANKLE_BAND.contains(joints.right_ankle.y)
}

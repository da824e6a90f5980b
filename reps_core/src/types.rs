//! Core domain types for the pose rep tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Landmarks and landmark frames from the pose detector
//! - Body-part numbering
//! - Exercises and screens
//! - Session keys and summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of reps that completes a session
pub const TARGET_REPS: u32 = 10;

/// Frames with fewer landmarks than this are ignored
pub const MIN_LANDMARKS: usize = 30;

// ============================================================================
// Landmark Types
// ============================================================================

/// A detected body-joint position in normalized camera space
///
/// `y` grows downward: a joint that is "above" another has the smaller `y`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One landmark event from the pose detector
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PoseFrame {
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, part: BodyPart) -> Option<Landmark> {
        self.landmarks.get(part.index()).copied()
    }
}

/// Body parts read by calibration and the rep classifier
///
/// Discriminants follow the detector's fixed 33-point numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl BodyPart {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The eight joints the tracker reads, pulled out of a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Joints {
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
    pub left_knee: Landmark,
    pub right_knee: Landmark,
    pub left_ankle: Landmark,
    pub right_ankle: Landmark,
}

impl Joints {
    /// Extract the tracked joints from a frame
    ///
    /// Returns None for sparse frames (fewer than [`MIN_LANDMARKS`] entries)
    /// and for frames where any tracked coordinate is NaN or infinite.
    pub fn from_frame(frame: &PoseFrame) -> Option<Self> {
        if frame.landmarks.len() < MIN_LANDMARKS {
            return None;
        }

        let joints = Self {
            left_shoulder: frame.get(BodyPart::LeftShoulder)?,
            right_shoulder: frame.get(BodyPart::RightShoulder)?,
            left_hip: frame.get(BodyPart::LeftHip)?,
            right_hip: frame.get(BodyPart::RightHip)?,
            left_knee: frame.get(BodyPart::LeftKnee)?,
            right_knee: frame.get(BodyPart::RightKnee)?,
            left_ankle: frame.get(BodyPart::LeftAnkle)?,
            right_ankle: frame.get(BodyPart::RightAnkle)?,
        };

        joints.all().iter().all(Landmark::is_finite).then_some(joints)
    }

    fn all(&self) -> [Landmark; 8] {
        [
            self.left_shoulder,
            self.right_shoulder,
            self.left_hip,
            self.right_hip,
            self.left_knee,
            self.right_knee,
            self.left_ankle,
            self.right_ankle,
        ]
    }
}

// ============================================================================
// Exercise and Screen Types
// ============================================================================

/// The five bodyweight exercises on the menu
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    HighKnees,
    Squats,
    Lunges,
    CalfRaises,
    OneLegSquat,
}

impl Exercise {
    /// Menu order
    pub const ALL: [Exercise; 5] = [
        Exercise::HighKnees,
        Exercise::Squats,
        Exercise::Lunges,
        Exercise::CalfRaises,
        Exercise::OneLegSquat,
    ];

    /// Stable snake_case identifier
    pub fn id(self) -> &'static str {
        match self {
            Exercise::HighKnees => "high_knees",
            Exercise::Squats => "squats",
            Exercise::Lunges => "lunges",
            Exercise::CalfRaises => "calf_raises",
            Exercise::OneLegSquat => "one_leg_squat",
        }
    }

    /// Human-readable label shown on the menu and rep counter
    pub fn label(self) -> &'static str {
        match self {
            Exercise::HighKnees => "High Knees",
            Exercise::Squats => "Squats",
            Exercise::Lunges => "Lunges",
            Exercise::CalfRaises => "Calf Raises",
            Exercise::OneLegSquat => "One Leg Squat",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Exercise {
    type Err = crate::Error;

    /// Accepts ids, labels, kebab-case and camelCase, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "highknees" => Ok(Exercise::HighKnees),
            "squats" | "squat" => Ok(Exercise::Squats),
            "lunges" | "lunge" => Ok(Exercise::Lunges),
            "calfraises" | "calfraise" => Ok(Exercise::CalfRaises),
            "onelegsquat" | "onelegsquats" => Ok(Exercise::OneLegSquat),
            _ => Err(crate::Error::UnknownExercise(s.to_string())),
        }
    }
}

/// Screens of the guided flow
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Intro,
    Menu,
    Calibration,
    Countdown,
    Session,
    Done,
}

impl Screen {
    /// Screens that show the live camera feed and accept "Back"
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Screen::Calibration | Screen::Countdown | Screen::Session
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Intro => "intro",
            Screen::Menu => "menu",
            Screen::Calibration => "calibration",
            Screen::Countdown => "countdown",
            Screen::Session => "session",
            Screen::Done => "done",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Identifies one started exercise; frames carrying another key are stale
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionKey(pub Uuid);

impl SessionKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of a completed session, emitted on reaching the done screen
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub key: SessionKey,
    pub exercise: Exercise,
    pub reps: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

//! Built-in exercise menu.
//!
//! The menu is fixed: five exercises in the order they are offered.

use crate::types::{BodyPart, Exercise};
use once_cell::sync::Lazy;

/// Menu entry for one exercise
#[derive(Clone, Debug)]
pub struct ExerciseInfo {
    pub exercise: Exercise,
    pub label: &'static str,
    /// Joints the rep rule compares
    pub joints: Vec<BodyPart>,
    pub cue: &'static str,
}

/// Cached menu - built once and reused
static MENU: Lazy<Vec<ExerciseInfo>> = Lazy::new(build_menu);

/// Get the exercise menu in display order
pub fn menu() -> &'static [ExerciseInfo] {
    &MENU
}

/// Look up the menu entry for an exercise
pub fn info(exercise: Exercise) -> &'static ExerciseInfo {
    // MENU is built from Exercise::ALL, so every exercise has an entry
    &MENU[Exercise::ALL
        .iter()
        .position(|e| *e == exercise)
        .unwrap_or_default()]
}

fn build_menu() -> Vec<ExerciseInfo> {
    use BodyPart::*;

    Exercise::ALL
        .iter()
        .map(|&exercise| {
            let (joints, cue) = match exercise {
                Exercise::HighKnees => (
                    vec![LeftHip, RightHip, LeftKnee, RightKnee],
                    "Drive each knee above hip height, alternating legs",
                ),
                Exercise::Squats => (
                    vec![LeftHip, RightHip, LeftKnee, RightKnee],
                    "Sit back until both hips drop below your knees",
                ),
                Exercise::Lunges => (
                    vec![LeftKnee, RightKnee],
                    "Step one leg back, then bring your knees level again",
                ),
                Exercise::CalfRaises => (
                    vec![LeftAnkle, RightAnkle],
                    "Rise onto your toes, then lower your heels fully",
                ),
                Exercise::OneLegSquat => (
                    vec![RightHip, RightKnee, LeftKnee, LeftAnkle],
                    "Lift your left foot and squat on the right leg",
                ),
            };

            ExerciseInfo {
                exercise,
                label: exercise.label(),
                joints,
                cue,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_order() {
        let labels: Vec<_> = menu().iter().map(|i| i.label).collect();
        assert_eq!(
            labels,
            vec!["High Knees", "Squats", "Lunges", "Calf Raises", "One Leg Squat"]
        );
    }

    #[test]
    fn test_info_lookup() {
        for exercise in Exercise::ALL {
            assert_eq!(info(exercise).exercise, exercise);
            assert!(!info(exercise).joints.is_empty());
        }
    }

    #[test]
    fn test_lunges_read_only_knees() {
        assert_eq!(
            info(Exercise::Lunges).joints,
            vec![BodyPart::LeftKnee, BodyPart::RightKnee]
        );
    }
}

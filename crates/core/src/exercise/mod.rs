//! Exercise catalogue.
//!
//! Every exercise shares the same two-phase repetition contract; what differs
//! is captured by an [`ExerciseProfile`]: which joints form the measured
//! angles and where the phase and quality thresholds sit.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Joint, TrackerError};

/// Exercises selectable from the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseType {
    #[serde(rename = "Arm Raise")]
    ArmRaise,
    #[serde(rename = "Knee Bend")]
    KneeBend,
    #[serde(rename = "Shoulder Roll")]
    ShoulderRoll,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 3] = [Self::ArmRaise, Self::KneeBend, Self::ShoulderRoll];

    pub fn name(self) -> &'static str {
        match self {
            Self::ArmRaise => "Arm Raise",
            Self::KneeBend => "Knee Bend",
            Self::ShoulderRoll => "Shoulder Roll",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::ArmRaise => "arm-raise",
            Self::KneeBend => "knee-bend",
            Self::ShoulderRoll => "shoulder-roll",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExerciseType {
    type Err = TrackerError;

    /// Accepts display names ("Arm Raise") and kebab-case ids ("arm-raise").
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value) || kind.slug() == value)
            .ok_or_else(|| TrackerError::msg(format!("unknown exercise type `{value}`")))
    }
}

/// Angle thresholds, in degrees, driving phase changes and form grading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Both angles below this put the tracker in the down phase.
    pub down: f32,
    /// Both angles above this count as the up position.
    pub up: f32,
    /// Inclusive band graded as perfect form.
    pub perfect_min: f32,
    pub perfect_max: f32,
    /// Both angles strictly above this, outside the perfect band, grade as good.
    pub good_floor: f32,
}

/// Configuration that turns the generic repetition state machine into a
/// tracker for one exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProfile {
    pub exercise: ExerciseType,
    pub left: [Joint; 3],
    pub right: [Joint; 3],
    pub thresholds: Thresholds,
    /// Plural body-part label used in feedback, e.g. "Arms".
    pub limb_label: &'static str,
}

impl ExerciseProfile {
    pub fn arm_raise() -> Self {
        Self {
            exercise: ExerciseType::ArmRaise,
            left: [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
            right: [Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist],
            thresholds: Thresholds {
                down: 40.0,
                up: 120.0,
                perfect_min: 130.0,
                perfect_max: 150.0,
                good_floor: 110.0,
            },
            limb_label: "Arms",
        }
    }

    /// Looks up the tracking profile for an exercise. Only exercises with a
    /// calibrated threshold set have one.
    pub fn for_exercise(exercise: ExerciseType) -> Option<Self> {
        match exercise {
            ExerciseType::ArmRaise => Some(Self::arm_raise()),
            ExerciseType::KneeBend | ExerciseType::ShoulderRoll => None,
        }
    }
}

//! Repetition state machine.
//!
//! Turns the per-frame limb angles into counted, graded repetitions. The down
//! and up thresholds are far apart, so an angle jittering around either one
//! cannot produce a second count: a rep is only scored on the transition from
//! the down phase into the up position, and the tracker only returns to the
//! down phase once both limbs drop below the down threshold.

use serde::{Deserialize, Serialize};

use crate::{geometry::joint_angle, ExerciseProfile, PoseFrame, Thresholds};

const PERFECT_POINTS: u32 = 10;
const GOOD_POINTS: u32 = 7;
const OKAY_POINTS: u32 = 5;

/// Position of the tracked limbs relative to the two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Down,
    Up,
}

/// Grade awarded to a completed repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormQuality {
    Perfect,
    Good,
    Okay,
}

impl FormQuality {
    /// Points (and score on the 0-10 scale) awarded for one rep of this grade.
    pub fn points(self) -> u32 {
        match self {
            Self::Perfect => PERFECT_POINTS,
            Self::Good => GOOD_POINTS,
            Self::Okay => OKAY_POINTS,
        }
    }

    fn classify(left: f32, right: f32, thresholds: &Thresholds) -> Self {
        let band = thresholds.perfect_min..=thresholds.perfect_max;
        if band.contains(&left) && band.contains(&right) {
            Self::Perfect
        } else if left > thresholds.good_floor && right > thresholds.good_floor {
            Self::Good
        } else {
            Self::Okay
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityTally {
    pub perfect: u32,
    pub good: u32,
    pub okay: u32,
}

impl QualityTally {
    /// Number of graded repetitions across all grades.
    pub fn total(&self) -> u32 {
        self.perfect + self.good + self.okay
    }

    fn record(&mut self, quality: FormQuality) {
        match quality {
            FormQuality::Perfect => self.perfect += 1,
            FormQuality::Good => self.good += 1,
            FormQuality::Okay => self.okay += 1,
        }
    }
}

/// Counters owned by one active tracker. `tally.total()` always equals
/// `rep_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepetitionState {
    pub phase: Phase,
    pub rep_count: u32,
    pub points: u32,
    pub tally: QualityTally,
}

/// Message shown to the user after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    Waiting,
    NoPerson,
    LimbNotVisible,
    Ready,
    Counted(FormQuality),
    Hold,
    Raising,
    Lowering,
}

impl Feedback {
    /// Renders the feedback for an exercise whose limbs are called `limb`
    /// (e.g. "Arms").
    pub fn message(&self, limb: &str) -> String {
        let lower = limb.to_lowercase();
        match self {
            Self::Waiting => "Waiting for person...".to_string(),
            Self::NoPerson => "No person detected".to_string(),
            Self::LimbNotVisible => format!("{limb} not visible"),
            Self::Ready => format!("{limb} Down - Ready"),
            Self::Counted(FormQuality::Perfect) => "Perfect Form! +10 pts".to_string(),
            Self::Counted(FormQuality::Good) => "Good Form! +7 pts".to_string(),
            Self::Counted(FormQuality::Okay) => "Keep Going! +5 pts".to_string(),
            Self::Hold => format!("{limb} Up - Hold"),
            Self::Raising => format!("Raising {lower}..."),
            Self::Lowering => format!("Lowering {lower}..."),
        }
    }
}

/// Left and right limb angles for one frame. `None` marks a limb whose joints
/// were not all visible.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimbAngles {
    pub left: Option<f32>,
    pub right: Option<f32>,
}

impl LimbAngles {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }
}

/// End-of-session overview of a tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSummary {
    pub total_reps: u32,
    pub total_points: u32,
    pub perfect_reps: u32,
    pub good_reps: u32,
    pub okay_reps: u32,
    /// Rounded to one decimal; 0 when no reps were counted.
    pub avg_points_per_rep: f32,
    pub feedback: String,
}

/// Two-phase repetition counter for a single exercise.
#[derive(Debug, Clone)]
pub struct RepTracker {
    profile: ExerciseProfile,
    visibility_threshold: f32,
    state: RepetitionState,
    feedback: Feedback,
}

impl RepTracker {
    /// Creates a tracker in the down phase with every counter at zero.
    pub fn new(profile: ExerciseProfile, visibility_threshold: f32) -> Self {
        Self {
            profile,
            visibility_threshold,
            state: RepetitionState::default(),
            feedback: Feedback::default(),
        }
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    /// Current counters and phase.
    pub fn state(&self) -> &RepetitionState {
        &self.state
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn feedback_text(&self) -> String {
        self.feedback.message(self.profile.limb_label)
    }

    /// Extracts the profile's limb angles from an estimator frame and advances
    /// the state machine.
    pub fn update(&mut self, frame: &PoseFrame) -> Feedback {
        // Joints below the visibility threshold are discarded before anything
        // else, so a frame made only of such joints holds no person.
        let threshold = self.visibility_threshold;
        if frame.samples().iter().all(|sample| sample.visibility < threshold) {
            self.feedback = Feedback::NoPerson;
            return self.feedback;
        }

        let angles = LimbAngles {
            left: joint_angle(frame, self.profile.left, self.visibility_threshold),
            right: joint_angle(frame, self.profile.right, self.visibility_threshold),
        };
        self.step(angles)
    }

    /// Advances the state machine with angles measured elsewhere.
    pub fn step(&mut self, angles: LimbAngles) -> Feedback {
        let (Some(left), Some(right)) = (angles.left, angles.right) else {
            self.feedback = Feedback::LimbNotVisible;
            return self.feedback;
        };

        let thresholds = self.profile.thresholds;
        self.feedback = if left < thresholds.down && right < thresholds.down {
            if self.state.phase == Phase::Up {
                tracing::debug!(left, right, "returned to down phase");
            }
            self.state.phase = Phase::Down;
            Feedback::Ready
        } else if left > thresholds.up && right > thresholds.up {
            match self.state.phase {
                Phase::Down => {
                    let quality = FormQuality::classify(left, right, &thresholds);
                    self.count_rep(quality);
                    tracing::info!(
                        exercise = %self.profile.exercise,
                        rep = self.state.rep_count,
                        ?quality,
                        left,
                        right,
                        "repetition counted"
                    );
                    Feedback::Counted(quality)
                }
                Phase::Up => Feedback::Hold,
            }
        } else {
            match self.state.phase {
                Phase::Down => Feedback::Raising,
                Phase::Up => Feedback::Lowering,
            }
        };

        self.feedback
    }

    /// Zeroes every counter and returns to the down phase.
    pub fn reset(&mut self) {
        self.state = RepetitionState::default();
        self.feedback = Feedback::default();
    }

    /// Builds an overview of the counters and the latest feedback.
    pub fn summary(&self) -> TrackerSummary {
        let avg_points_per_rep = if self.state.rep_count > 0 {
            let avg = self.state.points as f32 / self.state.rep_count as f32;
            (avg * 10.0).round() / 10.0
        } else {
            0.0
        };

        TrackerSummary {
            total_reps: self.state.rep_count,
            total_points: self.state.points,
            perfect_reps: self.state.tally.perfect,
            good_reps: self.state.tally.good,
            okay_reps: self.state.tally.okay,
            avg_points_per_rep,
            feedback: self.feedback_text(),
        }
    }

    fn count_rep(&mut self, quality: FormQuality) {
        self.state.rep_count += 1;
        self.state.phase = Phase::Up;
        self.state.points += quality.points();
        self.state.tally.record(quality);
    }
}

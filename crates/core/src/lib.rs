//! Core library for the Rehab Tracker application.
//!
//! Pose estimates arrive per frame through the [`PoseProvider`] seam, are
//! reduced to limb angles, and drive a [`RepTracker`] that counts and grades
//! repetitions. Finished sessions become [`SessionRecord`]s which the
//! [`Analytics`] aggregator turns into progress metrics. [`Dashboard`] ties the
//! pieces together for a front end.

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod history;
pub mod pose;
pub mod session;
pub mod tracker;

pub use analytics::{Analytics, ExerciseSummary, ImprovementArea, ProgressMetrics, WeeklyStats};
pub use config::{AnalyticsConfig, AppConfig, PoseConfig, MAX_WEEKLY_WINDOW_DAYS};
pub use dashboard::{ActiveSession, Dashboard, RunOutcome};
pub use error::{Result, TrackerError};
pub use exercise::{ExerciseProfile, ExerciseType, Thresholds};
pub use geometry::{joint_angle, vertex_angle};
pub use pose::{
    synthesize_arm_pose, FrameSource, Joint, JointSample, Point, PoseFrame, PoseProvider,
    RecordedPoseProvider, ScriptStep, ScriptedPoseSource,
};
pub use session::{average_quality_score, finalize, SessionInput, SessionRecord};
pub use tracker::{
    Feedback, FormQuality, LimbAngles, Phase, QualityTally, RepTracker, RepetitionState,
    TrackerSummary,
};

//! Boundary with the external body-pose estimator.
//!
//! Landmark detection itself happens elsewhere; this module only describes
//! what an estimator hands back for one frame and the traits the session loop
//! drives it through.

mod script;

pub use script::{synthesize_arm_pose, RecordedPoseProvider, ScriptStep, ScriptedPoseSource};

use serde::{Deserialize, Serialize};

use crate::{PoseConfig, Result};

/// Body landmarks addressable by angle queries, numbered as in the 33-point
/// body-pose skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Joint {
    Nose = 0,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl Joint {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            27 => Some(Self::LeftAnkle),
            28 => Some(Self::RightAnkle),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Pixel position of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Single landmark reported by the estimator for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub joint: Joint,
    pub x: i32,
    pub y: i32,
    /// Confidence in [0, 1] that the joint is visible.
    pub visibility: f32,
}

impl JointSample {
    pub fn new(joint: Joint, x: i32, y: i32, visibility: f32) -> Self {
        Self {
            joint,
            x,
            y,
            visibility,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Everything the estimator detected in a single frame. An empty frame means
/// nobody was detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseFrame {
    samples: Vec<JointSample>,
}

impl PoseFrame {
    pub fn new(samples: Vec<JointSample>) -> Self {
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[JointSample] {
        &self.samples
    }

    pub fn push(&mut self, sample: JointSample) {
        self.samples.push(sample);
    }

    /// Returns the position of `joint` if it was reported with at least the
    /// given visibility.
    pub fn position(&self, joint: Joint, visibility_threshold: f32) -> Option<Point> {
        self.samples
            .iter()
            .find(|sample| sample.joint == joint)
            .filter(|sample| sample.visibility >= visibility_threshold)
            .map(JointSample::position)
    }
}

/// Produces raw frames, e.g. from a webcam.
pub trait FrameSource {
    type Frame;

    /// Returns the next frame, `Ok(None)` once the stream has ended, or an
    /// acquisition error when the device can no longer be read.
    fn read_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// External body-pose estimator.
pub trait PoseProvider {
    type Frame;

    /// Applies the detection settings chosen for the session. Called once at
    /// session start; the values are passed through unchanged.
    fn configure(&mut self, _config: &PoseConfig) {}

    fn detect(&mut self, frame: &Self::Frame) -> Result<PoseFrame>;
}

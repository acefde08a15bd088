use std::{collections::VecDeque, path::Path};

use serde::{Deserialize, Serialize};

use super::{FrameSource, Joint, JointSample, PoseFrame, PoseProvider};
use crate::{Result, TrackerError};

const SYNTH_LIMB_LENGTH: f32 = 1000.0;
const SYNTH_RIGHT_ELBOW: (i32, i32) = (3000, 2000);
const SYNTH_LEFT_ELBOW: (i32, i32) = (1000, 2000);

fn one() -> usize {
    1
}

fn default_fps() -> f32 {
    30.0
}

/// One entry of a recorded or hand-written session script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Arm pose synthesized from the two elbow angles, in degrees.
    Angles {
        left: f32,
        right: f32,
        #[serde(default = "one")]
        repeat: usize,
    },
    /// Raw estimator output.
    Joints {
        samples: PoseFrame,
        #[serde(default = "one")]
        repeat: usize,
    },
    /// Frames in which nobody was detected.
    NoPerson {
        #[serde(default = "one")]
        repeat: usize,
    },
    /// The camera stops delivering frames.
    Fail { reason: String },
}

#[derive(Debug, Clone, Deserialize)]
struct ScriptFile {
    #[serde(default = "default_fps")]
    fps: f32,
    steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone)]
enum Planned {
    Frame(PoseFrame),
    Fail(String),
}

/// Deterministic [`FrameSource`] that replays a script of poses.
#[derive(Debug, Clone)]
pub struct ScriptedPoseSource {
    fps: f32,
    queue: VecDeque<Planned>,
}

impl ScriptedPoseSource {
    pub fn new(fps: f32, steps: Vec<ScriptStep>) -> Self {
        let mut queue = VecDeque::new();
        for step in steps {
            match step {
                ScriptStep::Angles {
                    left,
                    right,
                    repeat,
                } => {
                    let frame = synthesize_arm_pose(left, right);
                    queue.extend(std::iter::repeat(Planned::Frame(frame)).take(repeat));
                }
                ScriptStep::Joints { samples, repeat } => {
                    queue.extend(std::iter::repeat(Planned::Frame(samples)).take(repeat));
                }
                ScriptStep::NoPerson { repeat } => {
                    let frame = PoseFrame::empty();
                    queue.extend(std::iter::repeat(Planned::Frame(frame)).take(repeat));
                }
                ScriptStep::Fail { reason } => queue.push_back(Planned::Fail(reason)),
            }
        }
        Self { fps, queue }
    }

    /// Loads a script of the form `{ "fps": 30, "steps": [ ... ] }`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let script: ScriptFile = serde_json::from_str(content)?;
        if script.fps.is_nan() || script.fps <= 0.0 {
            return Err(TrackerError::msg("script fps must be positive"));
        }
        Ok(Self::new(script.fps, script.steps))
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frames still queued, failures excluded.
    pub fn remaining_frames(&self) -> usize {
        self.queue
            .iter()
            .filter(|planned| matches!(planned, Planned::Frame(_)))
            .count()
    }
}

impl FrameSource for ScriptedPoseSource {
    type Frame = PoseFrame;

    fn read_frame(&mut self) -> Result<Option<PoseFrame>> {
        match self.queue.pop_front() {
            Some(Planned::Frame(frame)) => Ok(Some(frame)),
            Some(Planned::Fail(reason)) => {
                self.queue.clear();
                Err(TrackerError::acquisition(reason))
            }
            None => Ok(None),
        }
    }
}

/// Provider for frames that already carry estimator output.
#[derive(Debug, Clone, Default)]
pub struct RecordedPoseProvider {
    detection_confidence: Option<f32>,
}

impl RecordedPoseProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detection confidence received from the last `configure` call.
    pub fn detection_confidence(&self) -> Option<f32> {
        self.detection_confidence
    }
}

impl PoseProvider for RecordedPoseProvider {
    type Frame = PoseFrame;

    fn configure(&mut self, config: &crate::PoseConfig) {
        self.detection_confidence = Some(config.detection_confidence);
    }

    fn detect(&mut self, frame: &PoseFrame) -> Result<PoseFrame> {
        Ok(frame.clone())
    }
}

/// Builds a fully visible frame whose shoulder-elbow-wrist angles match the
/// requested values up to pixel rounding.
pub fn synthesize_arm_pose(left_deg: f32, right_deg: f32) -> PoseFrame {
    let mut frame = PoseFrame::empty();
    push_arm(
        &mut frame,
        [Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist],
        SYNTH_RIGHT_ELBOW,
        right_deg,
        1.0,
    );
    push_arm(
        &mut frame,
        [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
        SYNTH_LEFT_ELBOW,
        left_deg,
        -1.0,
    );
    frame
}

fn push_arm(frame: &mut PoseFrame, joints: [Joint; 3], elbow: (i32, i32), degrees: f32, side: f32) {
    let [shoulder, elbow_joint, wrist] = joints;
    let radians = degrees.clamp(0.0, 180.0).to_radians();
    let (ex, ey) = elbow;
    let wx = ex + (side * SYNTH_LIMB_LENGTH * radians.sin()).round() as i32;
    let wy = ey - (SYNTH_LIMB_LENGTH * radians.cos()).round() as i32;

    frame.push(JointSample::new(shoulder, ex, ey - SYNTH_LIMB_LENGTH as i32, 1.0));
    frame.push(JointSample::new(elbow_joint, ex, ey, 1.0));
    frame.push(JointSample::new(wrist, wx, wy, 1.0));
}

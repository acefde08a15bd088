use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, TrackerError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pose: PoseConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections and fields fall back
    /// to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.pose.validate()?;
        self.analytics.validate()
    }
}

/// Settings forwarded to the pose provider when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub detection_confidence: f32,
    pub tracking_confidence: f32,
    /// Joints reported below this visibility count as not supplied.
    pub visibility_threshold: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            detection_confidence: 0.7,
            tracking_confidence: 0.7,
            visibility_threshold: 0.5,
        }
    }
}

impl PoseConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("detection_confidence", self.detection_confidence),
            ("tracking_confidence", self.tracking_confidence),
            ("visibility_threshold", self.visibility_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackerError::InvalidConfig(format!(
                    "pose.{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Longest accepted weekly-stats window, roughly a century.
pub const MAX_WEEKLY_WINDOW_DAYS: i64 = 36_500;

/// Thresholds used by the improvement-area heuristics and weekly stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of most recent scores inspected by the consistency check.
    pub consistency_window: usize,
    pub consistency_stddev_limit: f64,
    pub form_score_target: f64,
    pub max_mean_gap_hours: f64,
    /// Number of most recent durations inspected by the duration check.
    pub duration_window: usize,
    pub min_session_seconds: f64,
    /// Length of the trailing window behind the weekly stats, at most
    /// [`MAX_WEEKLY_WINDOW_DAYS`].
    pub weekly_window_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            consistency_window: 3,
            consistency_stddev_limit: 2.0,
            form_score_target: 7.0,
            max_mean_gap_hours: 48.0,
            duration_window: 3,
            min_session_seconds: 30.0,
            weekly_window_days: 7,
        }
    }
}

impl AnalyticsConfig {
    fn validate(&self) -> Result<()> {
        if self.consistency_window < 2 {
            return Err(TrackerError::InvalidConfig(
                "analytics.consistency_window needs at least two sessions".to_string(),
            ));
        }
        if self.duration_window == 0 {
            return Err(TrackerError::InvalidConfig(
                "analytics.duration_window needs at least one session".to_string(),
            ));
        }
        if !(1..=MAX_WEEKLY_WINDOW_DAYS).contains(&self.weekly_window_days) {
            return Err(TrackerError::InvalidConfig(format!(
                "analytics.weekly_window_days must lie in [1, {MAX_WEEKLY_WINDOW_DAYS}], got {}",
                self.weekly_window_days
            )));
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ExerciseType, FormQuality, QualityTally, RepetitionState};

/// Summary of one finished exercise session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Utc>,
    pub exercise_type: ExerciseType,
    pub rep_count: u32,
    /// Weighted form score on the 0-10 scale.
    pub avg_quality: f64,
    pub duration_seconds: f64,
}

/// Loosely typed session data as handed over by a caller or read back from
/// storage. Any missing field makes the input unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub timestamp: Option<DateTime<Utc>>,
    pub exercise_type: Option<ExerciseType>,
    pub rep_count: Option<u32>,
    pub avg_quality: Option<f64>,
    pub duration_seconds: Option<f64>,
}

impl SessionInput {
    /// Returns the complete record, or `None` if any field is absent.
    pub fn into_record(self) -> Option<SessionRecord> {
        Some(SessionRecord {
            timestamp: self.timestamp?,
            exercise_type: self.exercise_type?,
            rep_count: self.rep_count?,
            avg_quality: self.avg_quality?,
            duration_seconds: self.duration_seconds?,
        })
    }
}

impl From<SessionRecord> for SessionInput {
    fn from(record: SessionRecord) -> Self {
        Self {
            timestamp: Some(record.timestamp),
            exercise_type: Some(record.exercise_type),
            rep_count: Some(record.rep_count),
            avg_quality: Some(record.avg_quality),
            duration_seconds: Some(record.duration_seconds),
        }
    }
}

/// Mean points per graded rep, 0.0 when nothing was graded.
pub fn average_quality_score(tally: &QualityTally) -> f64 {
    let graded = tally.total();
    if graded == 0 {
        return 0.0;
    }

    let weighted = tally.perfect * FormQuality::Perfect.points()
        + tally.good * FormQuality::Good.points()
        + tally.okay * FormQuality::Okay.points();
    f64::from(weighted) / f64::from(graded)
}

/// Packages the final tracker state into a history record.
pub fn finalize(
    state: &RepetitionState,
    exercise_type: ExerciseType,
    duration_seconds: f64,
    timestamp: DateTime<Utc>,
) -> SessionRecord {
    SessionRecord {
        timestamp,
        exercise_type,
        rep_count: state.rep_count,
        avg_quality: average_quality_score(&state.tally),
        duration_seconds: duration_seconds.max(0.0),
    }
}

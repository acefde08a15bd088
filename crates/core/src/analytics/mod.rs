//! Progress analytics over the session history.
//!
//! Nothing is cached: every query recomputes its figures from the stored
//! records, which stays cheap at the scale of a personal training log.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnalyticsConfig, ExerciseType, SessionInput, SessionRecord};

/// Suggestions raised by the progress heuristics, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementArea {
    FormConsistency,
    FormQuality,
    SessionFrequency,
    SessionDuration,
}

impl fmt::Display for ImprovementArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FormConsistency => "Form consistency - scores vary significantly",
            Self::FormQuality => "Form quality - aim for higher accuracy",
            Self::SessionFrequency => "Session frequency - try to exercise more regularly",
            Self::SessionDuration => "Session duration - longer sessions may improve results",
        };
        f.write_str(text)
    }
}

/// Activity inside the trailing window that ends at the evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub sessions_this_week: usize,
    pub reps_this_week: u64,
    /// 0.0 when no session falls inside the window.
    pub avg_form_this_week: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMetrics {
    /// Filter the metrics were computed for; `None` covers every exercise.
    pub exercise_type: Option<ExerciseType>,
    pub total_reps: u64,
    pub total_sessions: usize,
    pub avg_form_score: f64,
    pub avg_duration: f64,
    pub best_session: SessionRecord,
    pub improvement_areas: Vec<ImprovementArea>,
    pub weekly_stats: WeeklyStats,
}

/// Lifetime totals across all exercises.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub total_sessions: usize,
    pub total_reps: u64,
    /// Distinct exercises in the order they first appear.
    pub exercise_types: Vec<ExerciseType>,
    pub total_time_spent: f64,
    pub avg_form_score: Option<f64>,
}

/// Owner of the chronological session history.
#[derive(Debug, Clone, Default)]
pub struct Analytics {
    config: AnalyticsConfig,
    history: Vec<SessionRecord>,
}

impl Analytics {
    /// Creates an empty history with the default heuristics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history evaluated with `config`.
    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Stored sessions in insertion order.
    pub fn history(&self) -> &[SessionRecord] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Appends a session. Inputs with a missing field or a non-finite score or
    /// duration are dropped without error; the return value only reports
    /// whether the session was kept.
    pub fn add(&mut self, input: impl Into<SessionInput>) -> bool {
        let input = input.into();
        match input.clone().into_record() {
            Some(record)
                if record.avg_quality.is_finite() && record.duration_seconds.is_finite() =>
            {
                self.history.push(record);
                true
            }
            _ => {
                tracing::debug!(?input, "ignoring malformed session");
                false
            }
        }
    }

    /// Appends a session produced by this crate, skipping validation.
    pub fn add_record(&mut self, record: SessionRecord) {
        self.history.push(record);
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Aggregates the sessions of one exercise (or all of them). Returns
    /// `None` when there is nothing to aggregate.
    pub fn progress_metrics(
        &self,
        exercise_type: Option<ExerciseType>,
        now: DateTime<Utc>,
    ) -> Option<ProgressMetrics> {
        let sessions: Vec<&SessionRecord> = self
            .history
            .iter()
            .filter(|record| exercise_type.map_or(true, |kind| record.exercise_type == kind))
            .collect();

        let best_session = best_session(&sessions)?.clone();
        let count = sessions.len() as f64;
        let avg_form_score = sessions.iter().map(|record| record.avg_quality).sum::<f64>() / count;
        let avg_duration = sessions
            .iter()
            .map(|record| record.duration_seconds)
            .sum::<f64>()
            / count;

        Some(ProgressMetrics {
            exercise_type,
            total_reps: total_reps(&sessions),
            total_sessions: sessions.len(),
            avg_form_score,
            avg_duration,
            best_session,
            improvement_areas: self.improvement_areas(&sessions, avg_form_score),
            weekly_stats: self.weekly_stats(&sessions, now),
        })
    }

    pub fn exercise_summary(&self) -> ExerciseSummary {
        let mut exercise_types = Vec::new();
        for record in &self.history {
            if !exercise_types.contains(&record.exercise_type) {
                exercise_types.push(record.exercise_type);
            }
        }

        let avg_form_score = if self.history.is_empty() {
            None
        } else {
            let sum: f64 = self.history.iter().map(|record| record.avg_quality).sum();
            Some(sum / self.history.len() as f64)
        };

        ExerciseSummary {
            total_sessions: self.history.len(),
            total_reps: self.history.iter().map(|record| u64::from(record.rep_count)).sum(),
            exercise_types,
            total_time_spent: self.history.iter().map(|record| record.duration_seconds).sum(),
            avg_form_score,
        }
    }

    fn improvement_areas(
        &self,
        sessions: &[&SessionRecord],
        avg_form_score: f64,
    ) -> Vec<ImprovementArea> {
        let config = &self.config;
        let mut areas = Vec::new();

        let window = config.consistency_window;
        if sessions.len() >= window {
            let recent: Vec<f64> = sessions[sessions.len() - window..]
                .iter()
                .map(|record| record.avg_quality)
                .collect();
            if sample_std_dev(&recent) > config.consistency_stddev_limit {
                areas.push(ImprovementArea::FormConsistency);
            }
        }

        if avg_form_score < config.form_score_target {
            areas.push(ImprovementArea::FormQuality);
        }

        if sessions.len() >= 2 && mean_gap_hours(sessions) > config.max_mean_gap_hours {
            areas.push(ImprovementArea::SessionFrequency);
        }

        let window = config.duration_window;
        if sessions.len() >= window
            && sessions[sessions.len() - window..]
                .iter()
                .any(|record| record.duration_seconds < config.min_session_seconds)
        {
            areas.push(ImprovementArea::SessionDuration);
        }

        areas
    }

    fn weekly_stats(&self, sessions: &[&SessionRecord], now: DateTime<Utc>) -> WeeklyStats {
        // A window reaching past the representable range covers every session.
        let cutoff = Duration::try_days(self.config.weekly_window_days)
            .and_then(|window| now.checked_sub_signed(window));
        let recent: Vec<&SessionRecord> = sessions
            .iter()
            .copied()
            .filter(|record| cutoff.map_or(true, |cutoff| record.timestamp >= cutoff))
            .collect();

        let avg_form_this_week = if recent.is_empty() {
            0.0
        } else {
            recent.iter().map(|record| record.avg_quality).sum::<f64>() / recent.len() as f64
        };

        WeeklyStats {
            sessions_this_week: recent.len(),
            reps_this_week: total_reps(&recent),
            avg_form_this_week,
        }
    }
}

fn total_reps(sessions: &[&SessionRecord]) -> u64 {
    sessions.iter().map(|record| u64::from(record.rep_count)).sum()
}

/// Highest-scoring session; ties go to the earliest timestamp, then to the
/// earliest insertion.
fn best_session<'a>(sessions: &[&'a SessionRecord]) -> Option<&'a SessionRecord> {
    let mut best: Option<&SessionRecord> = None;
    for &record in sessions {
        best = match best {
            Some(current)
                if record.avg_quality < current.avg_quality
                    || (record.avg_quality == current.avg_quality
                        && record.timestamp >= current.timestamp) =>
            {
                Some(current)
            }
            _ => Some(record),
        };
    }
    best
}

fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn mean_gap_hours(sessions: &[&SessionRecord]) -> f64 {
    let mut timestamps: Vec<DateTime<Utc>> =
        sessions.iter().map(|record| record.timestamp).collect();
    timestamps.sort();

    let total_ms: i64 = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds())
        .sum();
    total_ms as f64 / (timestamps.len() - 1) as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn record(timestamp: DateTime<Utc>, reps: u32, score: f64, duration: f64) -> SessionRecord {
        SessionRecord {
            timestamp,
            exercise_type: ExerciseType::ArmRaise,
            rep_count: reps,
            avg_quality: score,
            duration_seconds: duration,
        }
    }

    fn analytics(records: Vec<SessionRecord>) -> Analytics {
        let mut analytics = Analytics::new();
        for record in records {
            assert!(analytics.add(record));
        }
        analytics
    }

    #[test]
    fn empty_history_has_no_metrics() {
        let analytics = Analytics::new();
        assert!(analytics.progress_metrics(None, at(10, 0)).is_none());
    }

    #[test]
    fn filter_without_matches_has_no_metrics() {
        let analytics = analytics(vec![record(at(1, 9), 10, 8.0, 60.0)]);
        assert!(analytics
            .progress_metrics(Some(ExerciseType::KneeBend), at(2, 0))
            .is_none());
    }

    #[test]
    fn single_record_metrics() {
        let only = record(at(1, 9), 12, 8.5, 95.0);
        let analytics = analytics(vec![only.clone()]);

        let metrics = analytics.progress_metrics(None, at(2, 9)).unwrap();
        assert_eq!(metrics.total_reps, 12);
        assert_eq!(metrics.total_sessions, 1);
        assert_eq!(metrics.avg_form_score, 8.5);
        assert_eq!(metrics.avg_duration, 95.0);
        assert_eq!(metrics.best_session, only);
        assert!(metrics.improvement_areas.is_empty());
        assert_eq!(metrics.weekly_stats.sessions_this_week, 1);
        assert_eq!(metrics.weekly_stats.reps_this_week, 12);
    }

    #[test]
    fn drops_incomplete_input_silently() {
        let mut analytics = Analytics::new();
        let incomplete = SessionInput {
            timestamp: Some(at(1, 9)),
            exercise_type: Some(ExerciseType::ArmRaise),
            rep_count: Some(3),
            avg_quality: None,
            duration_seconds: Some(40.0),
        };

        assert!(!analytics.add(incomplete));
        assert!(analytics.is_empty());
    }

    #[test]
    fn drops_non_finite_scores() {
        let mut analytics = Analytics::new();
        assert!(!analytics.add(record(at(1, 9), 3, f64::NAN, 40.0)));
        assert!(analytics.is_empty());
    }

    #[test]
    fn filters_by_exercise_type() {
        let mut knee = record(at(2, 9), 4, 6.0, 50.0);
        knee.exercise_type = ExerciseType::KneeBend;
        let analytics = analytics(vec![record(at(1, 9), 10, 9.0, 60.0), knee]);

        let arm = analytics
            .progress_metrics(Some(ExerciseType::ArmRaise), at(3, 0))
            .unwrap();
        assert_eq!(arm.total_sessions, 1);
        assert_eq!(arm.total_reps, 10);

        let all = analytics.progress_metrics(None, at(3, 0)).unwrap();
        assert_eq!(all.total_sessions, 2);
        assert_eq!(all.avg_form_score, 7.5);
    }

    #[test]
    fn best_session_tie_prefers_earliest_timestamp() {
        let later = record(at(5, 9), 8, 9.0, 60.0);
        let earlier = record(at(2, 9), 6, 9.0, 60.0);
        let analytics = analytics(vec![record(at(1, 9), 5, 7.0, 60.0), later, earlier.clone()]);

        let metrics = analytics.progress_metrics(None, at(6, 0)).unwrap();
        assert_eq!(metrics.best_session, earlier);
    }

    #[test]
    fn frequency_flag_for_sparse_sessions() {
        let sparse = analytics(vec![
            record(at(1, 9), 10, 9.0, 60.0),
            record(at(5, 9), 10, 9.0, 60.0),
        ]);
        let metrics = sparse.progress_metrics(None, at(6, 0)).unwrap();
        assert_eq!(metrics.improvement_areas, vec![ImprovementArea::SessionFrequency]);

        let regular = analytics(vec![
            record(at(1, 9), 10, 9.0, 60.0),
            record(at(2, 9), 10, 9.0, 60.0),
        ]);
        let metrics = regular.progress_metrics(None, at(3, 0)).unwrap();
        assert!(metrics.improvement_areas.is_empty());
    }

    #[test]
    fn frequency_uses_chronological_gaps() {
        // Inserted out of order: sorted gaps are 24h and 24h.
        let analytics = analytics(vec![
            record(at(3, 9), 10, 9.0, 60.0),
            record(at(1, 9), 10, 9.0, 60.0),
            record(at(2, 9), 10, 9.0, 60.0),
        ]);
        let metrics = analytics.progress_metrics(None, at(4, 0)).unwrap();
        assert!(!metrics
            .improvement_areas
            .contains(&ImprovementArea::SessionFrequency));
    }

    #[test]
    fn flags_all_applicable_areas_in_order() {
        let analytics = analytics(vec![
            record(at(1, 9), 5, 10.0, 60.0),
            record(at(4, 9), 5, 2.0, 20.0),
            record(at(8, 9), 5, 5.0, 60.0),
        ]);

        let metrics = analytics.progress_metrics(None, at(9, 0)).unwrap();
        assert_eq!(
            metrics.improvement_areas,
            vec![
                ImprovementArea::FormConsistency,
                ImprovementArea::FormQuality,
                ImprovementArea::SessionFrequency,
                ImprovementArea::SessionDuration,
            ]
        );
    }

    #[test]
    fn consistency_only_looks_at_recent_sessions() {
        let analytics = analytics(vec![
            record(at(1, 9), 5, 0.0, 60.0),
            record(at(1, 12), 5, 9.0, 60.0),
            record(at(1, 15), 5, 9.5, 60.0),
            record(at(1, 18), 5, 10.0, 60.0),
        ]);

        let metrics = analytics.progress_metrics(None, at(2, 0)).unwrap();
        assert!(!metrics
            .improvement_areas
            .contains(&ImprovementArea::FormConsistency));
    }

    #[test]
    fn weekly_stats_use_evaluation_time() {
        let analytics = analytics(vec![
            record(at(1, 9), 10, 6.0, 60.0),
            record(at(10, 9), 4, 8.0, 60.0),
            record(at(12, 9), 6, 9.0, 60.0),
        ]);

        let metrics = analytics.progress_metrics(None, at(14, 9)).unwrap();
        assert_eq!(metrics.weekly_stats.sessions_this_week, 2);
        assert_eq!(metrics.weekly_stats.reps_this_week, 10);
        assert_eq!(metrics.weekly_stats.avg_form_this_week, 8.5);

        let much_later = analytics.progress_metrics(None, at(30, 9)).unwrap();
        assert_eq!(much_later.weekly_stats, WeeklyStats::default());
    }

    #[test]
    fn weekly_window_start_is_inclusive() {
        let analytics = analytics(vec![
            record(at(3, 9), 5, 6.0, 60.0),
            record(at(3, 8), 7, 4.0, 60.0),
        ]);

        // Exactly seven days after the first session.
        let metrics = analytics.progress_metrics(None, at(10, 9)).unwrap();
        assert_eq!(metrics.weekly_stats.sessions_this_week, 1);
        assert_eq!(metrics.weekly_stats.reps_this_week, 5);
        assert_eq!(metrics.weekly_stats.avg_form_this_week, 6.0);
    }

    #[test]
    fn oversized_weekly_window_covers_everything() {
        let config = AnalyticsConfig {
            weekly_window_days: 200_000_000_000,
            ..AnalyticsConfig::default()
        };
        let mut analytics = Analytics::with_config(config);
        analytics.add(record(at(1, 9), 10, 8.0, 60.0));
        analytics.add(record(at(2, 9), 4, 6.0, 60.0));

        let metrics = analytics.progress_metrics(None, at(30, 9)).unwrap();
        assert_eq!(metrics.weekly_stats.sessions_this_week, 2);
        assert_eq!(metrics.weekly_stats.reps_this_week, 14);
    }

    #[test]
    fn duration_check_has_its_own_window() {
        let config = AnalyticsConfig {
            duration_window: 1,
            ..AnalyticsConfig::default()
        };
        let mut analytics = Analytics::with_config(config);
        analytics.add(record(at(1, 9), 10, 8.0, 20.0));
        analytics.add(record(at(1, 12), 10, 8.0, 60.0));
        analytics.add(record(at(1, 15), 10, 8.0, 60.0));

        let metrics = analytics.progress_metrics(None, at(2, 0)).unwrap();
        assert!(metrics.improvement_areas.is_empty());

        analytics.add(record(at(1, 18), 10, 8.0, 25.0));
        let metrics = analytics.progress_metrics(None, at(2, 0)).unwrap();
        assert_eq!(metrics.improvement_areas, vec![ImprovementArea::SessionDuration]);
    }

    #[test]
    fn summary_lists_types_in_first_seen_order() {
        let mut knee = record(at(2, 9), 4, 6.0, 50.0);
        knee.exercise_type = ExerciseType::KneeBend;
        let analytics = analytics(vec![
            record(at(1, 9), 10, 8.0, 60.0),
            knee,
            record(at(3, 9), 6, 7.0, 40.0),
        ]);

        let summary = analytics.exercise_summary();
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.total_reps, 20);
        assert_eq!(
            summary.exercise_types,
            vec![ExerciseType::ArmRaise, ExerciseType::KneeBend]
        );
        assert_eq!(summary.total_time_spent, 150.0);
        assert_eq!(summary.avg_form_score, Some(7.0));

        assert_eq!(Analytics::new().exercise_summary(), ExerciseSummary::default());
    }

    #[test]
    fn clear_empties_history() {
        let mut analytics = analytics(vec![record(at(1, 9), 10, 8.0, 60.0)]);
        analytics.clear();
        assert!(analytics.is_empty());
        assert!(analytics.progress_metrics(None, at(2, 0)).is_none());
    }
}

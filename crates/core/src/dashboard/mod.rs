//! Application state driving exercise sessions.
//!
//! The [`Dashboard`] is created by whichever front end hosts the tracker and is
//! handed to every control action explicitly. It owns the active session (if
//! any) and the analytics history; the tracker and aggregator themselves hold
//! no other state.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::{
    session, Analytics, AppConfig, ExerciseProfile, ExerciseType, Feedback, FrameSource,
    PoseFrame, PoseProvider, RepTracker, Result, SessionRecord, TrackerError,
};

/// Tracking run between a start and a stop action.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub exercise: ExerciseType,
    pub started_at: DateTime<Utc>,
    pub tracker: RepTracker,
}

/// Why [`Dashboard::run`] returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The frame source ran dry.
    Exhausted { frames: usize },
    /// The stop flag was raised.
    Stopped { frames: usize },
}

/// Application state shared by every control action.
#[derive(Debug, Default)]
pub struct Dashboard {
    config: AppConfig,
    analytics: Analytics,
    active: Option<ActiveSession>,
}

impl Dashboard {
    /// Creates an idle dashboard with an empty history evaluated with
    /// `config.analytics`.
    pub fn new(config: AppConfig) -> Self {
        let analytics = Analytics::with_config(config.analytics.clone());
        Self {
            config,
            analytics,
            active: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn analytics_mut(&mut self) -> &mut Analytics {
        &mut self.analytics
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Starts tracking `exercise`. Starting while a session is already running
    /// leaves the running session untouched.
    pub fn start(&mut self, exercise: ExerciseType, at: DateTime<Utc>) -> Result<()> {
        if self.active.is_some() {
            tracing::debug!(%exercise, "start ignored, a session is already running");
            return Ok(());
        }

        let profile = ExerciseProfile::for_exercise(exercise)
            .ok_or(TrackerError::UnsupportedExercise(exercise))?;
        let tracker = RepTracker::new(profile, self.config.pose.visibility_threshold);
        self.active = Some(ActiveSession {
            exercise,
            started_at: at,
            tracker,
        });
        tracing::info!(%exercise, "session started");
        Ok(())
    }

    /// Feeds one estimator frame to the active tracker.
    pub fn process_frame(&mut self, frame: &PoseFrame) -> Option<Feedback> {
        self.active
            .as_mut()
            .map(|session| session.tracker.update(frame))
    }

    /// Ends the active session, appends its record to the history and returns
    /// it. Does nothing when no session is running.
    pub fn stop(&mut self, at: DateTime<Utc>) -> Option<SessionRecord> {
        let active = self.active.take()?;
        let duration = (at - active.started_at).num_milliseconds() as f64 / 1000.0;
        let record = session::finalize(active.tracker.state(), active.exercise, duration, at);

        tracing::info!(
            exercise = %record.exercise_type,
            reps = record.rep_count,
            avg_quality = record.avg_quality,
            duration = record.duration_seconds,
            "session finished"
        );
        self.analytics.add_record(record.clone());
        Some(record)
    }

    /// Discards the active session and the whole history.
    pub fn reset(&mut self) {
        self.active = None;
        self.analytics.clear();
        tracing::info!("dashboard reset");
    }

    /// Runs the frame loop for the active session until the source is
    /// exhausted or `stop` is raised. The flag is checked once per frame, so a
    /// frame that has started processing always completes.
    ///
    /// An acquisition failure ends the active session without recording it.
    pub fn run<S, P>(
        &mut self,
        source: &mut S,
        provider: &mut P,
        stop: &AtomicBool,
    ) -> Result<RunOutcome>
    where
        S: FrameSource,
        P: PoseProvider<Frame = S::Frame>,
    {
        if self.active.is_none() {
            return Err(TrackerError::msg("no active session to run"));
        }
        provider.configure(&self.config.pose);

        let mut frames = 0;
        loop {
            if stop.load(Ordering::Relaxed) {
                return Ok(RunOutcome::Stopped { frames });
            }

            let pose = match source.read_frame().and_then(|frame| match frame {
                Some(frame) => provider.detect(&frame).map(Some),
                None => Ok(None),
            }) {
                Ok(Some(pose)) => pose,
                Ok(None) => return Ok(RunOutcome::Exhausted { frames }),
                Err(err) => {
                    tracing::warn!(error = %err, frames, "aborting session");
                    self.active = None;
                    return Err(err);
                }
            };

            self.process_frame(&pose);
            frames += 1;
        }
    }
}

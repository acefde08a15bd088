use crate::ExerciseType;

/// Result alias that carries the custom [`TrackerError`] type.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Common error type for the core crate.
///
/// The repetition tracker and the analytics aggregator never produce errors;
/// only the I/O edges around them (configuration, history files, frame
/// acquisition) do.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("{0}")]
    Message(String),
    /// Camera or pose provider could not deliver a frame.
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),
    /// A session was requested for an exercise without a tracking profile.
    #[error("no tracking profile is available for `{0}`")]
    UnsupportedExercise(ExerciseType),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates an acquisition error from a camera or provider message.
    pub fn acquisition<T: Into<String>>(msg: T) -> Self {
        Self::Acquisition(msg.into())
    }
}

impl From<&str> for TrackerError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for TrackerError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

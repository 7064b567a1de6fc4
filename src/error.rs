//! Error type shared by the unit, trainer and challenge engine.
use thiserror::Error;

/// Recoverable failures returned by core commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Non-finite scalar, out-of-range index or unknown activation name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("training requested on an empty dataset")]
    EmptyDataset,
    #[error("a training run is already in progress")]
    AlreadyRunning,
    #[error("unknown goal: {0}")]
    UnknownGoal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejects NaN and infinities, naming the offending field.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidArgument(format!("{} must be finite, got {}", name, value)))
    }
}

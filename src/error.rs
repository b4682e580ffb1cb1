//! Error types for the attitude control loop.

use thiserror::Error;

/// Result type for control loop operations.
pub type TvcResult<T> = Result<T, TvcError>;

/// Errors raised by construction-time validation and loop operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TvcError {
    /// Invalid argument provided to a constructor or operation.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A value that feeds the dynamics was NaN or infinite.
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// `TimeClock::start` was called on a clock that is already running.
    #[error("Time clock already started")]
    ClockAlreadyStarted,

    /// The control loop thread panicked before returning.
    #[error("Control loop thread panicked")]
    LoopPanicked,
}

pub(crate) fn ensure_finite(value: f64, what: &'static str) -> TvcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TvcError::NonFinite { what, value })
    }
}

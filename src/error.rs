//! Errors raised by the profile engine and cost model.
use thiserror::Error;

/// Something prevented a profile or cost from being computed.
///
/// These are raised as soon as an input would otherwise produce a NaN or infinite result, so a
/// returned value is always finite.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The raw time series is malformed (negative or non-finite values, misaligned or gappy index)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Combined wind and solar output averages to zero, so it cannot be scaled to meet demand
    #[error("Mean wind and solar supply is zero: cannot scale supply to meet demand")]
    ZeroSupply,

    /// A financial or scenario parameter makes a formula undefined
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A reduction (mean, max, ...) was requested over a series with no periods
    #[error("Series contains no periods")]
    EmptySeries,
}

/// Convenience alias for results from the core computations
pub type EngineResult<T> = Result<T, EngineError>;

/// Return early with [`EngineError::InvalidParameter`] if a condition doesn't hold
macro_rules! ensure_param {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::EngineError::InvalidParameter(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_param;

/// Return early with [`EngineError::InvalidInput`] if a condition doesn't hold
macro_rules! ensure_input {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::EngineError::InvalidInput(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_input;

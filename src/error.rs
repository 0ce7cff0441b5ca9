//! Error types for filtering and posture analysis.
//!
//! Every fallible operation in the crate returns [`Result`], and validation
//! happens before any result is published.

use thiserror::Error;

/// Main error type for filtering and posture analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostureError {
    /// A numeric parameter is out of its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Trajectory axes have different lengths.
    #[error("Shape mismatch: x has {x} samples, y has {y} samples")]
    ShapeMismatch { x: usize, y: usize },

    /// A signal channel does not match the length of the first channel.
    #[error("Channel '{channel}' has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: String,
        expected: usize,
        actual: usize,
    },

    /// Trajectory is too short for dispersion statistics.
    #[error("Trajectory too short: need at least {min} samples, got {actual}")]
    TrajectoryTooShort { min: usize, actual: usize },

    /// Signal is too short for edge-padded zero-phase filtering.
    #[error("Signal too short for zero-phase filtering: need at least {min} samples, got {actual}")]
    SignalTooShort { min: usize, actual: usize },

    /// A presentation selector is not one of the known values.
    #[error("Unsupported {option}: '{value}'")]
    UnsupportedOption { option: &'static str, value: String },

    /// A cached result exists for different parameters.
    #[error("Cached result was computed with {cached}, requested {requested}")]
    CacheConflict { cached: String, requested: String },

    /// Linear algebra computation failed.
    #[error("Linear algebra error: {0}")]
    Linalg(String),

    /// Numerical computation resulted in NaN or Inf.
    #[error("Numerical instability: {context}")]
    NumericalInstability { context: String },
}

/// Result type alias for filtering and posture analysis.
pub type Result<T> = std::result::Result<T, PostureError>;

impl PostureError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a shape mismatch error.
    #[must_use]
    pub const fn shape_mismatch(x: usize, y: usize) -> Self {
        Self::ShapeMismatch { x, y }
    }

    /// Create a channel length mismatch error.
    #[must_use]
    pub fn channel_length_mismatch(channel: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ChannelLengthMismatch {
            channel: channel.into(),
            expected,
            actual,
        }
    }

    /// Create a trajectory too short error.
    #[must_use]
    pub const fn trajectory_too_short(min: usize, actual: usize) -> Self {
        Self::TrajectoryTooShort { min, actual }
    }

    /// Create a signal too short error.
    #[must_use]
    pub const fn signal_too_short(min: usize, actual: usize) -> Self {
        Self::SignalTooShort { min, actual }
    }

    /// Create an unsupported option error.
    #[must_use]
    pub fn unsupported_option(option: &'static str, value: impl Into<String>) -> Self {
        Self::UnsupportedOption {
            option,
            value: value.into(),
        }
    }

    /// Create a cache conflict error.
    #[must_use]
    pub fn cache_conflict(cached: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::CacheConflict {
            cached: cached.into(),
            requested: requested.into(),
        }
    }

    /// Create a linear algebra error.
    #[must_use]
    pub fn linalg(msg: impl Into<String>) -> Self {
        Self::Linalg(msg.into())
    }

    /// Create a numerical instability error.
    #[must_use]
    pub fn numerical_instability(context: impl Into<String>) -> Self {
        Self::NumericalInstability {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostureError::shape_mismatch(10, 5);
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("5"));

        let err = PostureError::unsupported_option("path style", "~");
        assert_eq!(err.to_string(), "Unsupported path style: '~'");
    }

    #[test]
    fn test_error_constructors() {
        let _ = PostureError::invalid_parameter("filter_passes must be at least 1");
        let _ = PostureError::channel_length_mismatch("Fz", 100, 99);
        let _ = PostureError::trajectory_too_short(2, 1);
        let _ = PostureError::signal_too_short(10, 4);
        let _ = PostureError::cache_conflict("2 passes", "4 passes");
        let _ = PostureError::linalg("singular system");
        let _ = PostureError::numerical_instability("nan in coefficients");
    }
}

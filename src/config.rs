//! Configuration for filtering and confidence-ellipse computation.
//!
//! # Example
//!
//! ```
//! use posturography::{EllipseConfig, FilterConfig};
//!
//! let filter = FilterConfig::new(2, 10.0);
//! assert!(filter.validate(100.0).is_ok());
//!
//! let ellipse = EllipseConfig::default().with_confidence(0.99);
//! assert!(ellipse.validate().is_ok());
//! ```

use crate::error::{PostureError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the critically damped filter.
///
/// The same pair drives the reference Butterworth filter, whose order is
/// `filter_passes` and whose normalized cutoff is
/// `cutoff_frequency / (fs / 2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    /// Number of cascaded critically damped stages (at least 1).
    pub filter_passes: u32,

    /// Desired cutoff frequency in Hz, strictly below Nyquist.
    pub cutoff_frequency: f64,
}

impl FilterConfig {
    /// Create a new filter configuration.
    #[must_use]
    pub const fn new(filter_passes: u32, cutoff_frequency: f64) -> Self {
        Self {
            filter_passes,
            cutoff_frequency,
        }
    }

    /// Validate the configuration against a sample rate.
    ///
    /// # Errors
    ///
    /// Returns [`PostureError::InvalidParameter`] if the sample rate is not
    /// positive, `filter_passes` is zero, or the cutoff is not strictly
    /// between 0 and Nyquist.
    pub fn validate(&self, fs: f64) -> Result<()> {
        validate_sample_rate(fs)?;
        if self.filter_passes < 1 {
            return Err(PostureError::invalid_parameter(
                "filter_passes must be at least 1",
            ));
        }
        if !self.cutoff_frequency.is_finite() || self.cutoff_frequency <= 0.0 {
            return Err(PostureError::invalid_parameter(format!(
                "cutoff_frequency must be positive, got {}",
                self.cutoff_frequency
            )));
        }
        let nyquist = fs / 2.0;
        if self.cutoff_frequency >= nyquist {
            return Err(PostureError::invalid_parameter(format!(
                "cutoff_frequency {} Hz must be below Nyquist ({nyquist} Hz)",
                self.cutoff_frequency
            )));
        }
        Ok(())
    }

    /// Normalized cutoff for the reference Butterworth design.
    #[must_use]
    pub fn normalized_cutoff(&self, fs: f64) -> f64 {
        self.cutoff_frequency / (fs / 2.0)
    }

    /// Set the number of passes.
    #[must_use]
    pub const fn with_filter_passes(mut self, filter_passes: u32) -> Self {
        self.filter_passes = filter_passes;
        self
    }

    /// Set the cutoff frequency.
    #[must_use]
    pub const fn with_cutoff_frequency(mut self, cutoff_frequency: f64) -> Self {
        self.cutoff_frequency = cutoff_frequency;
        self
    }
}

/// Which eigenvector defines the secondary ellipse axis angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SecondaryAxis {
    /// First column of the unsorted eigenvector matrix.
    ///
    /// This reproduces the historical output, where the secondary angle is
    /// not guaranteed to belong to the minor axis.
    #[default]
    Legacy,
    /// Eigenvector of the smaller eigenvalue.
    MinorEigenvector,
}

/// Parameters of the confidence ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipseConfig {
    /// Confidence level in `(0, 1)`, e.g. `0.95`.
    pub confidence: f64,

    /// Secondary axis selection.
    pub secondary_axis: SecondaryAxis,
}

impl Default for EllipseConfig {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            secondary_axis: SecondaryAxis::Legacy,
        }
    }
}

impl EllipseConfig {
    /// Create a legacy-compatible configuration for a confidence level.
    #[must_use]
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            ..Self::default()
        }
    }

    /// Configuration whose secondary axis is the true minor axis.
    #[must_use]
    pub const fn principal(confidence: f64) -> Self {
        Self {
            confidence,
            secondary_axis: SecondaryAxis::MinorEigenvector,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the confidence is not strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(PostureError::invalid_parameter(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        Ok(())
    }

    /// Set the confidence level.
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the secondary axis selection.
    #[must_use]
    pub const fn with_secondary_axis(mut self, secondary_axis: SecondaryAxis) -> Self {
        self.secondary_axis = secondary_axis;
        self
    }
}

/// Check that a sample rate is positive and finite.
///
/// # Errors
///
/// Returns [`PostureError::InvalidParameter`] otherwise.
pub fn validate_sample_rate(fs: f64) -> Result<()> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(PostureError::invalid_parameter(format!(
            "sample rate must be positive, got {fs}"
        )));
    }
    Ok(())
}

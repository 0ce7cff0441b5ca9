//! Static posturographic analysis.
//!
//! [`StaticAnalyzer`] reduces a center-of-pressure [`Trajectory2D`] to
//! dispersion, path length and speed descriptors, and fits a confidence
//! ellipse whose area completes the parameter set.
//!
//! Parameter definitions follow Paillard & Noé, *Techniques and Methods for
//! Testing the Postural Function in Healthy and Pathological Subjects*,
//! Biomed Res Int. 2015.
//!
//! # Example
//!
//! ```
//! use posturography::{StaticAnalyzer, Trajectory2D};
//!
//! let x: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
//! let y: Vec<f64> = (0..200).map(|i| (i as f64 * 0.07).cos()).collect();
//! let trajectory = Trajectory2D::new(x, y, 100.0)?;
//!
//! let mut analyzer = StaticAnalyzer::new(trajectory);
//! let params = analyzer.parameters(0.95)?;
//! assert!(params.path_length > 0.0);
//! assert!(params.area > 0.0);
//! # Ok::<(), posturography::PostureError>(())
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::cache::{Memo, RecomputePolicy};
use crate::config::EllipseConfig;
use crate::ellipse::{confidence_ellipse_interval, EllipseParameters, EllipsePath};
use crate::error::Result;
use crate::math::stats::{mean, range, std_population};
use crate::style::LineStyle;
use crate::trajectory::Trajectory2D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status of frequency-domain posture parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum FrequencyAnalysis {
    /// Spectral parameters are not computed.
    #[default]
    NotAvailable,
}

/// Dispersion, path and speed descriptors of a trajectory.
///
/// Per-axis values are `[x, y]` (medio-lateral, antero-posterior).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwayStatistics {
    /// Mean position.
    pub mean_position: [f64; 2],
    /// Cumulative path length, in input units.
    pub path_length: f64,
    /// Max − min per axis.
    pub range: [f64; 2],
    /// Population standard deviation per axis.
    pub standard_deviation: [f64; 2],
    /// Mean absolute speed per axis, input units per second.
    pub speed_by_axis: [f64; 2],
    /// Mean total speed, input units per second.
    pub speed_total: f64,
    /// Frequency-domain parameters.
    pub frequency: FrequencyAnalysis,
}

/// Full static parameter set: sway statistics plus ellipse area.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StaticParameters {
    /// Mean position.
    pub mean_position: [f64; 2],
    /// Cumulative path length.
    pub path_length: f64,
    /// Max − min per axis.
    pub range: [f64; 2],
    /// Population standard deviation per axis.
    pub standard_deviation: [f64; 2],
    /// Mean absolute speed per axis.
    pub speed_by_axis: [f64; 2],
    /// Mean total speed.
    pub speed_total: f64,
    /// Confidence ellipse area.
    pub area: f64,
    /// Confidence level the area refers to.
    pub confidence: f64,
    /// Frequency-domain parameters.
    pub frequency: FrequencyAnalysis,
}

/// A named statistic value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParameterValue {
    /// Single value.
    Scalar(f64),
    /// Per-axis `[x, y]` value.
    Axes([f64; 2]),
}

impl StaticParameters {
    /// Combine sway statistics with an ellipse.
    #[must_use]
    pub fn from_parts(stats: SwayStatistics, ellipse: &EllipseParameters) -> Self {
        Self {
            mean_position: stats.mean_position,
            path_length: stats.path_length,
            range: stats.range,
            standard_deviation: stats.standard_deviation,
            speed_by_axis: stats.speed_by_axis,
            speed_total: stats.speed_total,
            area: ellipse.area,
            confidence: ellipse.confidence(),
            frequency: stats.frequency,
        }
    }

    /// All parameters by name.
    ///
    /// Frequency parameters are absent while [`FrequencyAnalysis::NotAvailable`].
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, ParameterValue> {
        BTreeMap::from([
            ("mean_position", ParameterValue::Axes(self.mean_position)),
            ("path_length", ParameterValue::Scalar(self.path_length)),
            ("range", ParameterValue::Axes(self.range)),
            ("standard_deviation", ParameterValue::Axes(self.standard_deviation)),
            ("speed_by_axis", ParameterValue::Axes(self.speed_by_axis)),
            ("speed_total", ParameterValue::Scalar(self.speed_total)),
            ("area", ParameterValue::Scalar(self.area)),
        ])
    }
}

/// Data for drawing the trajectory together with its ellipse.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipsePlot {
    /// Trajectory medio-lateral samples.
    pub x: Vec<f64>,
    /// Trajectory antero-posterior samples.
    pub y: Vec<f64>,
    /// Line style for the trajectory.
    pub path_style: LineStyle,
    /// Ellipse boundary.
    pub ellipse: EllipsePath,
}

/// Compute dispersion, path and speed descriptors.
#[must_use]
pub fn calculate_params(trajectory: &Trajectory2D) -> SwayStatistics {
    let (dx, dy, total) = trajectory.displacements();
    let period = trajectory.period();

    let speed_x: Vec<f64> = dx.iter().map(|d| d / period).collect();
    let speed_y: Vec<f64> = dy.iter().map(|d| d / period).collect();
    let speed: Vec<f64> = total.iter().map(|d| d / period).collect();

    SwayStatistics {
        mean_position: trajectory.mean_position(),
        path_length: total.iter().sum(),
        range: [range(trajectory.x()), range(trajectory.y())],
        standard_deviation: [std_population(trajectory.x()), std_population(trajectory.y())],
        speed_by_axis: [mean(&speed_x), mean(&speed_y)],
        speed_total: mean(&speed),
        frequency: FrequencyAnalysis::NotAvailable,
    }
}

/// Static analysis of one trajectory with a cached confidence ellipse.
///
/// The ellipse cache keeps only the most recent configuration: asking for a
/// different confidence level replaces it.
#[derive(Debug, Clone)]
pub struct StaticAnalyzer {
    trajectory: Trajectory2D,
    ellipse: Memo<EllipseConfig, EllipseParameters>,
}

impl StaticAnalyzer {
    /// Create an analyzer; nothing is computed yet.
    #[must_use]
    pub fn new(trajectory: Trajectory2D) -> Self {
        Self {
            trajectory,
            ellipse: Memo::new(),
        }
    }

    /// The analyzed trajectory.
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory2D {
        &self.trajectory
    }

    /// Sway statistics, recomputed on each call.
    #[must_use]
    pub fn calculate_params(&self) -> SwayStatistics {
        calculate_params(&self.trajectory)
    }

    /// Legacy-compatible confidence ellipse at `confidence`.
    ///
    /// # Errors
    ///
    /// Returns an error for a confidence outside `(0, 1)`.
    pub fn confidence_ellipse_interval(&mut self, confidence: f64) -> Result<&EllipseParameters> {
        self.ellipse_with(EllipseConfig::new(confidence))
    }

    /// Confidence ellipse whose secondary angle is the true minor axis.
    ///
    /// # Errors
    ///
    /// Returns an error for a confidence outside `(0, 1)`.
    pub fn principal_confidence_ellipse(&mut self, confidence: f64) -> Result<&EllipseParameters> {
        self.ellipse_with(EllipseConfig::principal(confidence))
    }

    /// Confidence ellipse for an explicit configuration.
    ///
    /// Reuses the cache when `config` matches it, otherwise replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration.
    pub fn ellipse_with(&mut self, config: EllipseConfig) -> Result<&EllipseParameters> {
        let trajectory = &self.trajectory;
        self.ellipse
            .get_or_try_compute(config, RecomputePolicy::Overwrite, |cfg| {
                confidence_ellipse_interval(trajectory.x(), trajectory.y(), cfg)
            })
    }

    /// Most recently computed ellipse, if any.
    #[must_use]
    pub fn cached_ellipse(&self) -> Option<&EllipseParameters> {
        self.ellipse.value()
    }

    /// Drop the cached ellipse.
    pub fn invalidate(&mut self) {
        self.ellipse.invalidate();
    }

    /// All static parameters, using the ellipse at `confidence`.
    ///
    /// # Errors
    ///
    /// Returns an error for a confidence outside `(0, 1)`.
    pub fn parameters(&mut self, confidence: f64) -> Result<StaticParameters> {
        self.parameters_with(EllipseConfig::new(confidence))
    }

    /// All static parameters for an explicit ellipse configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration.
    pub fn parameters_with(&mut self, config: EllipseConfig) -> Result<StaticParameters> {
        debug!(
            samples = self.trajectory.len(),
            confidence = config.confidence,
            "computing static parameters"
        );
        let stats = calculate_params(&self.trajectory);
        let ellipse = self.ellipse_with(config)?;
        Ok(StaticParameters::from_parts(stats, ellipse))
    }

    /// Trajectory and ellipse boundary for drawing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PostureError::UnsupportedOption`] for an unknown
    /// `path_style`, or an error for an invalid configuration.
    pub fn ellipse_plot(&mut self, config: EllipseConfig, path_style: &str) -> Result<EllipsePlot> {
        let path_style: LineStyle = path_style.parse()?;
        let ellipse = self.ellipse_with(config)?.path.clone();
        Ok(EllipsePlot {
            x: self.trajectory.x().to_vec(),
            y: self.trajectory.y().to_vec(),
            path_style,
            ellipse,
        })
    }
}

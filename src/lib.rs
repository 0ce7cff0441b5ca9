//! Posturography Library
//!
//! Critically damped zero-phase filtering and static posturographic analysis
//! of center-of-pressure (COP) signals recorded on a force platform.
//!
//! Two independent analyses are provided:
//!
//! - **Filtering**: a [`SignalSet`] of named channels is low-pass filtered
//!   with a critically damped second-order section applied forward and
//!   backward, with a Butterworth filter of the same order as a reference.
//! - **Static analysis**: a [`StaticAnalyzer`] reduces a [`Trajectory2D`] to
//!   mean position, path length, range, standard deviation, speed and the
//!   area of a confidence ellipse.
//!
//! # Quick Start
//!
//! ```
//! use posturography::{FilterConfig, SignalSet, StaticAnalyzer, Trajectory2D};
//!
//! let n = 1000;
//! let fs = 100.0;
//! let ml: Vec<f64> = (0..n).map(|i| (i as f64 * 0.013).sin() + 0.1 * (i as f64 * 1.7).sin()).collect();
//! let ap: Vec<f64> = (0..n).map(|i| 2.0 * (i as f64 * 0.007).cos() + 0.1 * (i as f64 * 2.3).cos()).collect();
//!
//! // Smooth the raw COP channels.
//! let mut signals = SignalSet::new(vec![("ML".into(), ml), ("AP".into(), ap)], fs)?;
//! let filtered = signals.critically_damped(FilterConfig::new(2, 10.0))?;
//!
//! // Analyze the filtered path.
//! let x = filtered.channel("ML").unwrap_or_default().to_vec();
//! let y = filtered.channel("AP").unwrap_or_default().to_vec();
//! let mut analyzer = StaticAnalyzer::new(Trajectory2D::new(x, y, fs)?);
//! let params = analyzer.parameters(0.95)?;
//!
//! assert!(params.path_length > params.range[0].max(params.range[1]));
//! # Ok::<(), posturography::PostureError>(())
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod cache;
pub mod config;
pub mod ellipse;
pub mod error;
pub mod math;
pub mod posture;
pub mod signal;
pub mod style;
pub mod trajectory;

// Re-exports for convenient access
pub use cache::{Memo, RecomputePolicy};
pub use config::{EllipseConfig, FilterConfig, SecondaryAxis};
pub use ellipse::{confidence_ellipse_interval, EllipseParameters, EllipsePath, BOUNDARY_POINTS};
pub use error::{PostureError, Result};
pub use math::filter::{
    butterworth_coefficients, critically_damped_coefficients, filtfilt, FilterCoefficients,
};
pub use posture::{
    calculate_params, EllipsePlot, FrequencyAnalysis, ParameterValue, StaticAnalyzer,
    StaticParameters, SwayStatistics,
};
pub use signal::{Channel, ChannelComparison, FilterComparison, FilteredSignalSet, SignalSet};
pub use style::LineStyle;
pub use trajectory::Trajectory2D;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn sway(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x = (0..n)
            .map(|i| {
                let t = i as f64 / 100.0;
                3.0 * (0.4 * t).sin() + 0.5 * (7.0 * t).sin() + 0.2 * (i as f64 * 2.1).sin()
            })
            .collect();
        let y = (0..n)
            .map(|i| {
                let t = i as f64 / 100.0;
                5.0 * (0.25 * t).cos() + 0.4 * (9.0 * t).cos() + 0.2 * (i as f64 * 2.6).cos()
            })
            .collect();
        (x, y)
    }

    #[test]
    fn test_full_pipeline() {
        let (x, y) = sway(3000);
        let mut signals =
            SignalSet::new(vec![("x".into(), x.clone()), ("y".into(), y.clone())], 100.0).unwrap();

        let filtered = signals.critically_damped(FilterConfig::new(2, 5.0)).unwrap();
        let fx = filtered.channel("x").unwrap().to_vec();
        let fy = filtered.channel("y").unwrap().to_vec();

        let raw = StaticAnalyzer::new(Trajectory2D::new(x, y, 100.0).unwrap())
            .parameters(0.95)
            .unwrap();
        let smooth = StaticAnalyzer::new(Trajectory2D::new(fx, fy, 100.0).unwrap())
            .parameters(0.95)
            .unwrap();

        // Smoothing shortens the path but barely moves the center.
        assert!(smooth.path_length < raw.path_length);
        assert!((smooth.mean_position[0] - raw.mean_position[0]).abs() < 0.05);
        assert!((smooth.mean_position[1] - raw.mean_position[1]).abs() < 0.05);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

//! Two-dimensional center-of-pressure trajectories.

use crate::config::validate_sample_rate;
use crate::error::{PostureError, Result};
use crate::math::stats::mean;

/// Minimum number of samples for dispersion and speed statistics.
pub const MIN_SAMPLES: usize = 2;

/// A sampled 2D path, typically medio-lateral (`x`) and antero-posterior (`y`)
/// center-of-pressure displacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory2D {
    x: Vec<f64>,
    y: Vec<f64>,
    fs: f64,
}

impl Trajectory2D {
    /// Create a trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`PostureError::ShapeMismatch`] if the axes differ in length,
    /// [`PostureError::TrajectoryTooShort`] below [`MIN_SAMPLES`], and
    /// [`PostureError::InvalidParameter`] for a non-positive sample rate.
    pub fn new(x: Vec<f64>, y: Vec<f64>, fs: f64) -> Result<Self> {
        if x.len() != y.len() {
            return Err(PostureError::shape_mismatch(x.len(), y.len()));
        }
        if x.len() < MIN_SAMPLES {
            return Err(PostureError::trajectory_too_short(MIN_SAMPLES, x.len()));
        }
        validate_sample_rate(fs)?;
        Ok(Self { x, y, fs })
    }

    /// Medio-lateral samples.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Antero-posterior samples.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Sample rate in Hz.
    #[must_use]
    pub const fn fs(&self) -> f64 {
        self.fs
    }

    /// Sampling period in seconds.
    #[must_use]
    pub fn period(&self) -> f64 {
        1.0 / self.fs
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false; a trajectory holds at least [`MIN_SAMPLES`] samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Mean position `[x, y]`.
    ///
    /// Both the descriptive statistics and the ellipse center use this.
    #[must_use]
    pub fn mean_position(&self) -> [f64; 2] {
        [mean(&self.x), mean(&self.y)]
    }

    /// Absolute per-step displacements `(|Δx|, |Δy|, sqrt(Δx² + Δy²))`.
    #[must_use]
    pub fn displacements(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let dx: Vec<f64> = self.x.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let dy: Vec<f64> = self.y.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let total = dx.iter().zip(&dy).map(|(a, b)| a.hypot(*b)).collect();
        (dx, dy, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_mismatch() {
        let err = Trajectory2D::new(vec![0.0; 5], vec![0.0; 4], 100.0).unwrap_err();
        assert_eq!(err, PostureError::shape_mismatch(5, 4));
    }

    #[test]
    fn test_too_short_and_bad_rate() {
        assert_eq!(
            Trajectory2D::new(vec![1.0], vec![1.0], 100.0).unwrap_err(),
            PostureError::trajectory_too_short(2, 1)
        );
        assert!(matches!(
            Trajectory2D::new(vec![0.0; 3], vec![0.0; 3], 0.0),
            Err(PostureError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_displacements() {
        let t = Trajectory2D::new(vec![0.0, 3.0, 3.0], vec![0.0, 4.0, 2.0], 50.0).unwrap();
        let (dx, dy, total) = t.displacements();
        assert_eq!(dx, vec![3.0, 0.0]);
        assert_eq!(dy, vec![4.0, 2.0]);
        assert_relative_eq!(total[0], 5.0);
        assert_relative_eq!(total[1], 2.0);
        assert_relative_eq!(t.period(), 0.02);
        assert_eq!(t.mean_position(), [2.0, 2.0]);
    }
}

//! Confidence ellipse of a 2D point cloud.
//!
//! The ellipse is derived from the eigendecomposition of the sample
//! covariance matrix and scaled by the square root of the chi-square
//! quantile with two degrees of freedom, so that under a Gaussian assumption
//! the requested fraction of the distribution lies inside it.
//!
//! # Pipeline Overview
//!
//! 1. Validate axis lengths
//! 2. Sample covariance of `(x, y)`
//! 3. Eigendecomposition; identify the major and minor eigenvalues
//! 4. Principal and secondary axis angles, folded into `[0, π)`
//! 5. Scale factor `k = sqrt(chi2(conf, 2))`
//! 6. Boundary of 201 points, scaled, rotated and translated
//! 7. Axis half-lengths read from the boundary in polar form
//! 8. Area and axis ratio

use std::f64::consts::PI;

use tracing::debug;

use crate::config::{EllipseConfig, SecondaryAxis};
use crate::error::{PostureError, Result};
use crate::math::linalg::{cart2pol, covariance2, symmetric_eigen2, Eigen2};
use crate::math::stats::{chi2_quantile, mean};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of boundary segments per half revolution.
pub const HALF_TURN_SEGMENTS: usize = 100;

/// Number of boundary points (one full closed revolution).
pub const BOUNDARY_POINTS: usize = 2 * HALF_TURN_SEGMENTS + 1;

/// Ellipse boundary in the original coordinate units.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipsePath {
    /// Medio-lateral coordinates.
    pub x: Vec<f64>,
    /// Antero-posterior coordinates.
    pub y: Vec<f64>,
}

impl EllipsePath {
    /// Number of boundary points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate over `[x, y]` points.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y])
    }
}

/// Everything derived while fitting a confidence ellipse.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipseParameters {
    /// Configuration that produced these parameters.
    pub config: EllipseConfig,

    /// Ellipse center, the mean position `[x, y]`.
    pub center: [f64; 2],

    /// Sample covariance matrix of `(x, y)`.
    pub covariance: [[f64; 2]; 2],

    /// Raw eigendecomposition of the covariance, in solver order.
    pub eigen: Eigen2,

    /// Square roots of the eigenvalues, `[major, minor]`.
    pub sqrt_eigenvalues: [f64; 2],

    /// Principal and secondary axis angles in radians, in `[0, π)`.
    pub axis_angle: [f64; 2],

    /// Principal and secondary axis angles in degrees, in `[0, 180)`.
    pub axis_angle_degrees: [f64; 2],

    /// Chi-square scale factor `k`.
    pub scale: f64,

    /// Boundary path with [`BOUNDARY_POINTS`] points.
    pub path: EllipsePath,

    /// Half-lengths measured along the principal and secondary angles.
    pub axis_length: [f64; 2],

    /// Area `π · major · minor`.
    pub area: f64,

    /// `major / minor`, `None` when the minor half-length is zero.
    pub ratio: Option<f64>,
}

impl EllipseParameters {
    /// Confidence level of this ellipse.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.config.confidence
    }
}

/// Fit the confidence ellipse of a point cloud.
///
/// # Arguments
///
/// * `x` - Medio-lateral samples
/// * `y` - Antero-posterior samples
/// * `config` - Confidence level and secondary-axis selection
///
/// # Errors
///
/// Returns [`PostureError::ShapeMismatch`] if the axes differ in length,
/// [`PostureError::TrajectoryTooShort`] for fewer than two samples and
/// [`PostureError::InvalidParameter`] for a confidence outside `(0, 1)`.
pub fn confidence_ellipse_interval(
    x: &[f64],
    y: &[f64],
    config: &EllipseConfig,
) -> Result<EllipseParameters> {
    if x.len() != y.len() {
        return Err(PostureError::shape_mismatch(x.len(), y.len()));
    }
    config.validate()?;

    let center = [mean(x), mean(y)];
    let covariance = covariance2(x, y)?;
    let eigen = symmetric_eigen2(&covariance);

    let [lo, hi] = eigen.argsort();
    let sqrt_eigenvalues = [
        eigen.values[hi].max(0.0).sqrt(),
        eigen.values[lo].max(0.0).sqrt(),
    ];

    let secondary_column = match config.secondary_axis {
        SecondaryAxis::Legacy => 0,
        SecondaryAxis::MinorEigenvector => lo,
    };
    let (primary_rad, primary_deg) = axis_angle(eigen.column(hi));
    let (secondary_rad, secondary_deg) = axis_angle(eigen.column(secondary_column));
    let axis_angle = [primary_rad, secondary_rad];

    let scale = chi2_quantile(config.confidence, 2.0)?.sqrt();

    let (bx, by) = boundary(&eigen.sorted(), scale);
    let polar: Vec<(f64, f64)> = bx.iter().zip(&by).map(|(&px, &py)| cart2pol(px, py)).collect();
    let axis_length = [
        radius_nearest(&polar, axis_angle[0]),
        radius_nearest(&polar, axis_angle[1]),
    ];

    let path = EllipsePath {
        x: bx.iter().map(|v| v + center[0]).collect(),
        y: by.iter().map(|v| v + center[1]).collect(),
    };

    let area = PI * axis_length[0] * axis_length[1];
    let ratio = (axis_length[1] > 0.0).then(|| axis_length[0] / axis_length[1]);

    debug!(
        confidence = config.confidence,
        samples = x.len(),
        area,
        "fitted confidence ellipse"
    );

    Ok(EllipseParameters {
        config: *config,
        center,
        covariance,
        eigen,
        sqrt_eigenvalues,
        axis_angle,
        axis_angle_degrees: [primary_deg, secondary_deg],
        scale,
        path,
        axis_length,
        area,
        ratio,
    })
}

/// Angle of an axis vector in radians and degrees, folded into `[0, π)`.
fn axis_angle(v: [f64; 2]) -> (f64, f64) {
    let mut rad = v[1].atan2(v[0]);
    let mut deg = rad.to_degrees();
    if deg < 0.0 {
        deg += 180.0;
        rad += PI;
    }
    (rad, deg)
}

/// Scaled, untranslated boundary for an ascending-sorted decomposition.
fn boundary(sorted: &Eigen2, scale: f64) -> (Vec<f64>, Vec<f64>) {
    let s0 = sorted.values[0].max(0.0).sqrt();
    let s1 = sorted.values[1].max(0.0).sqrt();
    let v = &sorted.vectors;

    (0..BOUNDARY_POINTS)
        .map(|i| {
            let p = i as f64 * (PI / HALF_TURN_SEGMENTS as f64);
            let u = [p.cos() * s0, p.sin() * s1];
            (
                scale * (u[0] * v[0][0] + u[1] * v[0][1]),
                scale * (u[0] * v[1][0] + u[1] * v[1][1]),
            )
        })
        .unzip()
}

/// Radius of the first boundary point whose polar angle is closest to `angle`.
fn radius_nearest(polar: &[(f64, f64)], angle: f64) -> f64 {
    let mut best = (f64::INFINITY, 0.0);
    for &(rho, phi) in polar {
        let dist = (phi - angle).abs();
        if dist < best.0 {
            best = (dist, rho);
        }
    }
    best.1
}

//! Linear algebra utilities for the confidence ellipse.
//!
//! This module provides the 2×2 sample covariance and its symmetric
//! eigendecomposition using nalgebra.

use nalgebra::{Matrix2, SymmetricEigen};

use crate::error::{PostureError, Result};
use crate::math::stats::mean;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Eigendecomposition of a 2×2 symmetric matrix.
///
/// Pairs are kept in the order [`symmetric_eigen2`] lists them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Eigen2 {
    /// Eigenvalues, unsorted.
    pub values: [f64; 2],

    /// Eigenvectors as columns: `vectors[row][col]`, column `i` pairs with
    /// `values[i]`.
    pub vectors: [[f64; 2]; 2],
}

impl Eigen2 {
    /// Get the i-th eigenvector as `[x, y]`.
    #[must_use]
    pub fn column(&self, i: usize) -> [f64; 2] {
        debug_assert!(i < 2);
        [self.vectors[0][i], self.vectors[1][i]]
    }

    /// Indices that sort the eigenvalues ascending.
    #[must_use]
    pub fn argsort(&self) -> [usize; 2] {
        if self.values[1] < self.values[0] {
            [1, 0]
        } else {
            [0, 1]
        }
    }

    /// Eigenvalues and eigenvectors reordered ascending by eigenvalue.
    #[must_use]
    pub fn sorted(&self) -> Self {
        let [lo, hi] = self.argsort();
        Self {
            values: [self.values[lo], self.values[hi]],
            vectors: [
                [self.vectors[0][lo], self.vectors[0][hi]],
                [self.vectors[1][lo], self.vectors[1][hi]],
            ],
        }
    }
}

/// Sample covariance matrix of two equal-length series (`n - 1` normalization).
///
/// # Errors
///
/// Returns an error if the lengths differ or fewer than two samples are given.
pub fn covariance2(x: &[f64], y: &[f64]) -> Result<[[f64; 2]; 2]> {
    if x.len() != y.len() {
        return Err(PostureError::shape_mismatch(x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err(PostureError::trajectory_too_short(2, x.len()));
    }

    let mx = mean(x);
    let my = mean(y);
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let denom = (x.len() - 1) as f64;
    Ok([[sxx / denom, sxy / denom], [sxy / denom, syy / denom]])
}

/// Symmetric eigendecomposition of a 2×2 matrix.
///
/// Pairs are listed the way LAPACK's general eigensolver (`dgeev`) lists
/// them: the eigenvalue nearest `m[0][0]` comes first. With a non-zero
/// off-diagonal term that is the larger eigenvalue when `m[0][0] >= m[1][1]`
/// and the smaller one otherwise. A diagonal matrix keeps its diagonal order.
#[must_use]
pub fn symmetric_eigen2(m: &[[f64; 2]; 2]) -> Eigen2 {
    let matrix = Matrix2::new(m[0][0], m[0][1], m[1][0], m[1][1]);
    let eigen = SymmetricEigen::new(matrix);
    let values = eigen.eigenvalues;
    let vectors = eigen.eigenvectors;

    let first = if m[0][1] == 0.0 {
        // Diagonal input: the pair whose eigenvector lies along x.
        usize::from(vectors[(0, 0)].abs() < vectors[(0, 1)].abs())
    } else {
        let larger = usize::from(values[1] > values[0]);
        if m[0][0] >= m[1][1] {
            larger
        } else {
            1 - larger
        }
    };
    let second = 1 - first;

    Eigen2 {
        values: [values[first], values[second]],
        vectors: [
            [vectors[(0, first)], vectors[(0, second)]],
            [vectors[(1, first)], vectors[(1, second)]],
        ],
    }
}

/// Convert Cartesian coordinates to polar `(rho, phi)`, `phi` in `(-π, π]`.
#[must_use]
#[inline]
pub fn cart2pol(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x))
}

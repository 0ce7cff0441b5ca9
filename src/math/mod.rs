//! Mathematical utilities for filtering and posture analysis.
//!
//! This module provides:
//! - [`filter`]: critically damped and Butterworth design, zero-phase filtering
//! - [`linalg`]: 2×2 covariance and eigendecomposition
//! - [`stats`]: descriptive statistics and chi-square quantiles

pub mod filter;
pub mod linalg;
pub mod stats;

pub use filter::{
    butterworth_coefficients, critically_damped_coefficients, filtfilt, FilterCoefficients,
};
pub use linalg::{covariance2, symmetric_eigen2, Eigen2};
pub use stats::chi2_quantile;

//! Descriptive statistics and distribution quantiles.

use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF};

use crate::error::{PostureError, Result};

/// Arithmetic mean. Returns NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (`ddof = 0`).
#[must_use]
pub fn std_population(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Difference between the largest and smallest value.
#[must_use]
pub fn range(values: &[f64]) -> f64 {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    max - min
}

/// Newton steps applied to the bracketing quantile.
const QUANTILE_REFINE_STEPS: usize = 3;

/// Quantile of the chi-square distribution.
///
/// The bisection result of `statrs` is polished with Newton steps on the
/// CDF so the quantile is accurate to machine precision.
///
/// # Errors
///
/// Returns an error if `p` is not in `(0, 1)`, the degrees of freedom are
/// not positive, or the quantile is not finite.
pub fn chi2_quantile(p: f64, dof: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(PostureError::invalid_parameter(format!(
            "probability must be in (0, 1), got {p}"
        )));
    }
    let dist = ChiSquared::new(dof).map_err(|e| PostureError::invalid_parameter(e.to_string()))?;
    let mut q = dist.inverse_cdf(p);
    for _ in 0..QUANTILE_REFINE_STEPS {
        let density = dist.pdf(q);
        if !(density.is_finite() && density > 0.0) {
            break;
        }
        let step = (dist.cdf(q) - p) / density;
        q -= step;
        if step.abs() <= f64::EPSILON * q.abs() {
            break;
        }
    }
    if !q.is_finite() {
        return Err(PostureError::numerical_instability(format!(
            "chi-square quantile at p={p}, dof={dof}"
        )));
    }
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&v), 5.0);
        assert_relative_eq!(std_population(&v), 2.0);
    }

    #[test]
    fn test_range() {
        assert_relative_eq!(range(&[3.0, -1.0, 2.5]), 4.0);
        assert_relative_eq!(range(&[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_chi2_two_dof_closed_form() {
        // With two degrees of freedom the quantile is -2 ln(1 - p).
        for &p in &[0.5, 0.68, 0.9, 0.95, 0.99] {
            let q = chi2_quantile(p, 2.0).unwrap();
            assert_relative_eq!(q, -2.0 * (1.0 - p).ln(), max_relative = 1e-10);
        }
    }

    #[test]
    fn test_chi2_one_dof() {
        let q = chi2_quantile(0.95, 1.0).unwrap();
        assert_relative_eq!(q, 3.841_458_820_694_124, max_relative = 1e-10);
    }

    #[test]
    fn test_chi2_invalid() {
        assert!(chi2_quantile(0.0, 2.0).is_err());
        assert!(chi2_quantile(1.0, 2.0).is_err());
        assert!(chi2_quantile(0.5, -1.0).is_err());
    }
}

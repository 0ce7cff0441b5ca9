//! Recursive filter design and zero-phase application.
//!
//! Two designs are provided:
//! - [`critically_damped_coefficients`]: a second-order section whose step
//!   response has no overshoot, with the cutoff corrected for the number of
//!   cascaded passes.
//! - [`butterworth_coefficients`]: the classic maximally flat low-pass, used as
//!   a reference.
//!
//! Both are applied with [`filtfilt`], which runs the filter forward and then
//! backward with odd edge extension and steady-state initial conditions.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{debug, trace};

use crate::config::validate_sample_rate;
use crate::error::{PostureError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transfer-function coefficients of a recursive filter.
///
/// The feedback vector is normalized so that `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterCoefficients {
    /// Feed-forward coefficients.
    pub b: Vec<f64>,
    /// Feedback coefficients, `a[0] == 1`.
    pub a: Vec<f64>,
}

impl FilterCoefficients {
    /// Build coefficients, normalizing by `a[0]`.
    ///
    /// # Errors
    ///
    /// Returns an error if either vector is empty, `a[0]` is zero, or any
    /// coefficient is not finite.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        let a0 = match a.first() {
            Some(&a0) if a0 != 0.0 => a0,
            _ => {
                return Err(PostureError::invalid_parameter(
                    "feedback coefficients must start with a non-zero term",
                ))
            }
        };
        if b.is_empty() {
            return Err(PostureError::invalid_parameter(
                "feed-forward coefficients must not be empty",
            ));
        }

        let b: Vec<f64> = b.into_iter().map(|v| v / a0).collect();
        let a: Vec<f64> = a.into_iter().map(|v| v / a0).collect();

        if b.iter().chain(a.iter()).any(|v| !v.is_finite()) {
            return Err(PostureError::numerical_instability(
                "non-finite filter coefficient",
            ));
        }

        Ok(Self { b, a })
    }

    /// Number of taps, `max(len(a), len(b))`.
    #[must_use]
    pub fn ntaps(&self) -> usize {
        self.a.len().max(self.b.len())
    }

    /// Default edge padding used by [`filtfilt`].
    #[must_use]
    pub fn padlen(&self) -> usize {
        3 * self.ntaps()
    }

    /// Steady-state gain at DC, `sum(b) / sum(a)`.
    #[must_use]
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }
}

/// Frequency correction factor for `filter_passes` cascaded critically damped
/// stages.
///
/// `c = 1 / sqrt(2^(1 / (2 * passes)) - 1)`
#[must_use]
pub fn correction_factor(filter_passes: u32) -> f64 {
    let exponent = 1.0 / (2.0 * f64::from(filter_passes));
    1.0 / (2f64.powf(exponent) - 1.0).sqrt()
}

/// Derive the second-order section of a critically damped low-pass filter.
///
/// # Arguments
///
/// * `filter_passes` - Number of cascaded stages (at least 1)
/// * `cutoff_frequency` - Desired cutoff in Hz
/// * `fs` - Sample rate in Hz
///
/// # Errors
///
/// Returns [`PostureError::InvalidParameter`] if the inputs are out of range
/// or the corrected cutoff reaches Nyquist, where the pre-warped frequency
/// diverges.
pub fn critically_damped_coefficients(
    filter_passes: u32,
    cutoff_frequency: f64,
    fs: f64,
) -> Result<FilterCoefficients> {
    validate_sample_rate(fs)?;
    if filter_passes < 1 {
        return Err(PostureError::invalid_parameter(
            "filter_passes must be at least 1",
        ));
    }
    if !cutoff_frequency.is_finite() || cutoff_frequency <= 0.0 {
        return Err(PostureError::invalid_parameter(format!(
            "cutoff_frequency must be positive, got {cutoff_frequency}"
        )));
    }

    let nyquist = fs / 2.0;
    if cutoff_frequency >= nyquist {
        return Err(PostureError::invalid_parameter(format!(
            "cutoff_frequency {cutoff_frequency} Hz must be below Nyquist ({nyquist} Hz)"
        )));
    }

    let c = correction_factor(filter_passes);
    let f_adjusted = cutoff_frequency * c;
    if f_adjusted >= nyquist {
        return Err(PostureError::invalid_parameter(format!(
            "corrected cutoff {f_adjusted:.3} Hz ({filter_passes} passes) reaches Nyquist ({nyquist} Hz)"
        )));
    }

    let w = (PI * f_adjusted / fs).tan();
    if !w.is_finite() || w <= 0.0 {
        return Err(PostureError::numerical_instability(format!(
            "pre-warped frequency {w} for corrected cutoff {f_adjusted} Hz"
        )));
    }

    let k1 = 2.0 * w;
    let k2 = w * w;

    let b0 = k2 / (1.0 + k1 + k2);
    let b1 = 2.0 * b0;
    let b2 = b0;
    let a1 = 2.0 * b0 * (1.0 / k2 - 1.0);
    let a2 = 1.0 - (b0 + b1 + b2 + a1);

    debug!(
        filter_passes,
        cutoff_frequency, fs, correction = c, "derived critically damped coefficients"
    );

    FilterCoefficients::new(vec![b0, b1, b2], vec![1.0, -a1, -a2])
}

/// Design a digital Butterworth low-pass filter.
///
/// Poles of the analog prototype are pre-warped with `tan(π·wn/2)` and mapped
/// through the bilinear transform; all zeros sit at `z = -1` and the gain is
/// set for unity DC response.
///
/// # Arguments
///
/// * `order` - Filter order (at least 1)
/// * `wn` - Cutoff normalized to Nyquist, in `(0, 1)`
///
/// # Errors
///
/// Returns [`PostureError::InvalidParameter`] for a zero order or a cutoff
/// outside `(0, 1)`.
pub fn butterworth_coefficients(order: u32, wn: f64) -> Result<FilterCoefficients> {
    if order < 1 {
        return Err(PostureError::invalid_parameter(
            "Butterworth order must be at least 1",
        ));
    }
    if !(wn > 0.0 && wn < 1.0) {
        return Err(PostureError::invalid_parameter(format!(
            "normalized cutoff must be in (0, 1), got {wn}"
        )));
    }

    let n = order as usize;
    let warped = (PI * wn / 2.0).tan();

    // Left-half-plane prototype poles, scaled and mapped to the z-plane.
    let poles: Vec<Complex64> = (0..n)
        .map(|i| {
            let m = 2.0 * i as f64 - (n as f64 - 1.0);
            let s = -Complex64::from_polar(1.0, PI * m / (2.0 * n as f64)) * warped;
            (Complex64::new(1.0, 0.0) + s) / (Complex64::new(1.0, 0.0) - s)
        })
        .collect();

    let a: Vec<f64> = poly(&poles).iter().map(|c| c.re).collect();
    let zeros = vec![Complex64::new(-1.0, 0.0); n];
    let b_unit: Vec<f64> = poly(&zeros).iter().map(|c| c.re).collect();

    let gain = a.iter().sum::<f64>() / b_unit.iter().sum::<f64>();
    let b = b_unit.into_iter().map(|v| v * gain).collect();

    debug!(order, wn, "derived Butterworth coefficients");

    FilterCoefficients::new(b, a)
}

/// Expand a set of roots into monic polynomial coefficients, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= root * prev;
        }
    }
    coeffs
}

/// Apply a recursive filter with an explicit initial state.
///
/// Direct form II transposed. `state` must hold `ntaps - 1` values and
/// contains the final state on return.
///
/// # Errors
///
/// Returns [`PostureError::InvalidParameter`] if `state` has the wrong length.
pub fn lfilter(coeffs: &FilterCoefficients, x: &[f64], state: &mut [f64]) -> Result<Vec<f64>> {
    let ntaps = coeffs.ntaps();
    if state.len() != ntaps - 1 {
        return Err(PostureError::invalid_parameter(format!(
            "filter state must hold {} values, got {}",
            ntaps - 1,
            state.len()
        )));
    }
    let b = padded(&coeffs.b, ntaps);
    let a = padded(&coeffs.a, ntaps);

    let order = ntaps - 1;
    let mut y = Vec::with_capacity(x.len());
    for &xi in x {
        let yi = if order == 0 { b[0] * xi } else { b[0] * xi + state[0] };
        for j in 0..order {
            let next = if j + 1 < order { state[j + 1] } else { 0.0 };
            state[j] = b[j + 1] * xi + next - a[j + 1] * yi;
        }
        y.push(yi);
    }
    Ok(y)
}

/// Steady-state initial conditions for a step response.
///
/// Solves `(I - Aᵀ) zi = b[1..] - a[1..] * b[0]`, where `A` is the companion
/// matrix of `a`.
///
/// # Errors
///
/// Returns [`PostureError::Linalg`] if the system is singular, which happens
/// when the filter has a pole at `z = 1`.
pub fn lfilter_zi(coeffs: &FilterCoefficients) -> Result<Vec<f64>> {
    let ntaps = coeffs.ntaps();
    let b = padded(&coeffs.b, ntaps);
    let a = padded(&coeffs.a, ntaps);
    let m = ntaps - 1;
    if m == 0 {
        return Ok(Vec::new());
    }

    let mut i_minus_a = DMatrix::<f64>::identity(m, m);
    for j in 0..m {
        i_minus_a[(j, 0)] += a[j + 1];
    }
    for i in 1..m {
        i_minus_a[(i - 1, i)] -= 1.0;
    }

    let rhs = DVector::from_iterator(m, (0..m).map(|j| b[j + 1] - a[j + 1] * b[0]));

    let zi = i_minus_a
        .lu()
        .solve(&rhs)
        .ok_or_else(|| PostureError::linalg("singular system for filter initial conditions"))?;

    Ok(zi.iter().copied().collect())
}

/// Zero-phase forward-backward filtering.
///
/// The signal is extended at both ends by an odd reflection of
/// [`FilterCoefficients::padlen`] samples, filtered forward from steady state,
/// reversed, filtered again, reversed back and trimmed to its original length.
///
/// # Errors
///
/// Returns [`PostureError::SignalTooShort`] if the signal has no more samples
/// than the padding length.
pub fn filtfilt(coeffs: &FilterCoefficients, x: &[f64]) -> Result<Vec<f64>> {
    let padlen = coeffs.padlen();
    if x.len() <= padlen {
        return Err(PostureError::signal_too_short(padlen + 1, x.len()));
    }

    let zi = lfilter_zi(coeffs)?;
    let extended = odd_extension(x, padlen);
    trace!(samples = x.len(), padlen, "zero-phase filtering");

    let mut state: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
    let mut y = lfilter(coeffs, &extended, &mut state)?;

    let y_last = y.last().copied().unwrap_or_default();
    y.reverse();
    let mut state: Vec<f64> = zi.iter().map(|z| z * y_last).collect();
    let mut y = lfilter(coeffs, &y, &mut state)?;
    y.reverse();

    Ok(y[padlen..padlen + x.len()].to_vec())
}

/// Odd extension of `x` by `n` samples on each side.
fn odd_extension(x: &[f64], n: usize) -> Vec<f64> {
    let len = x.len();
    let first = x[0];
    let last = x[len - 1];

    let mut ext = Vec::with_capacity(len + 2 * n);
    ext.extend((0..n).map(|i| 2.0 * first - x[n - i]));
    ext.extend_from_slice(x);
    ext.extend((0..n).map(|i| 2.0 * last - x[len - 2 - i]));
    ext
}

fn padded(coeffs: &[f64], len: usize) -> Vec<f64> {
    let mut out = coeffs.to_vec();
    out.resize(len, 0.0);
    out
}

//! Multi-channel signals and critically damped filtering.
//!
//! A [`SignalSet`] holds equal-length raw channels sampled at a common rate.
//! Filtering every channel with the critically damped filter produces a
//! [`FilteredSignalSet`], which is cached inside the set; a Butterworth
//! reference can be computed alongside for comparison.
//!
//! # Example
//!
//! ```
//! use posturography::{FilterConfig, SignalSet};
//!
//! let fx: Vec<f64> = (0..500).map(|i| (i as f64 * 0.05).sin()).collect();
//! let fy: Vec<f64> = (0..500).map(|i| (i as f64 * 0.03).cos()).collect();
//! let mut signals = SignalSet::new(vec![("Fx".into(), fx), ("Fy".into(), fy)], 100.0)?;
//!
//! let filtered = signals.critically_damped(FilterConfig::new(2, 10.0))?;
//! assert_eq!(filtered.channel("Fx").map(<[f64]>::len), Some(500));
//! # Ok::<(), posturography::PostureError>(())
//! ```

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::cache::{Memo, RecomputePolicy};
use crate::config::{validate_sample_rate, FilterConfig};
use crate::error::{PostureError, Result};
use crate::math::filter::{
    butterworth_coefficients, critically_damped_coefficients, filtfilt, FilterCoefficients,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named channel of samples.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel {
    /// Channel name, e.g. `"Fz"` or `"COPx"`.
    pub name: String,
    /// Samples.
    pub samples: Vec<f64>,
}

/// Filtered channels with the configuration and coefficients that produced
/// them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilteredSignalSet {
    /// Filter parameters.
    pub config: FilterConfig,
    /// Coefficients applied forward and backward.
    pub coefficients: FilterCoefficients,
    /// Filtered channels, same names and order as the raw set.
    pub channels: Vec<Channel>,
}

impl FilteredSignalSet {
    /// Filtered samples of a channel.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        find_channel(&self.channels, name)
    }

    /// Channel names in order.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }
}

/// Per-channel arrays for drawing raw against filtered data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelComparison {
    /// Channel name.
    pub name: String,
    /// Raw samples.
    pub raw: Vec<f64>,
    /// Critically damped samples.
    pub damped: Vec<f64>,
    /// Butterworth reference samples, when requested.
    pub butterworth: Option<Vec<f64>>,
}

/// Raw, critically damped and reference signals on a shared time base.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterComparison {
    /// Time base in seconds, `t_i = i / fs`.
    pub time: Vec<f64>,
    /// One entry per channel, in order.
    pub channels: Vec<ChannelComparison>,
}

/// Equal-length named channels sampled at a common rate.
#[derive(Debug, Clone)]
pub struct SignalSet {
    channels: Vec<Channel>,
    fs: f64,
    filtered: Memo<FilterConfig, FilteredSignalSet>,
}

impl SignalSet {
    /// Create a signal set.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no channels, the channels are empty or
    /// differ in length, a name repeats, or the sample rate is not positive.
    pub fn new(channels: Vec<(String, Vec<f64>)>, fs: f64) -> Result<Self> {
        validate_sample_rate(fs)?;

        let expected = match channels.first() {
            Some((_, samples)) if !samples.is_empty() => samples.len(),
            Some((name, _)) => {
                return Err(PostureError::invalid_parameter(format!(
                    "channel '{name}' is empty"
                )))
            }
            None => {
                return Err(PostureError::invalid_parameter(
                    "signal set needs at least one channel",
                ))
            }
        };

        let mut seen = HashSet::new();
        for (name, samples) in &channels {
            if samples.len() != expected {
                return Err(PostureError::channel_length_mismatch(
                    name.as_str(),
                    expected,
                    samples.len(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(PostureError::invalid_parameter(format!(
                    "duplicate channel name '{name}'"
                )));
            }
        }

        let channels = channels
            .into_iter()
            .map(|(name, samples)| Channel { name, samples })
            .collect();

        Ok(Self {
            channels,
            fs,
            filtered: Memo::new(),
        })
    }

    /// Sample rate in Hz.
    #[must_use]
    pub const fn fs(&self) -> f64 {
        self.fs
    }

    /// Samples per channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |c| c.samples.len())
    }

    /// Always false; construction rejects empty channels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw channels in order.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel names in order.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// Raw samples of a channel.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        find_channel(&self.channels, name)
    }

    /// Time base `t_i = i / fs` in seconds.
    #[must_use]
    pub fn time(&self) -> Vec<f64> {
        (0..self.len()).map(|i| i as f64 / self.fs).collect()
    }

    /// Critically damped, zero-phase filtered channels.
    ///
    /// Computed on the first call and cached; later calls with the same
    /// configuration return the cache.
    ///
    /// # Errors
    ///
    /// Returns [`PostureError::CacheConflict`] if the cache was built with a
    /// different configuration (use [`Self::recompute_critically_damped`] or
    /// [`Self::invalidate_filtered`]), or an error for invalid parameters or
    /// channels too short to filter.
    pub fn critically_damped(&mut self, config: FilterConfig) -> Result<&FilteredSignalSet> {
        let (channels, fs) = (&self.channels, self.fs);
        self.filtered
            .get_or_try_compute(config, RecomputePolicy::Reject, |cfg| {
                filter_critically_damped(channels, fs, cfg)
            })
    }

    /// Filter again with `config`, replacing any cached result.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or channels too short to
    /// filter; the previous cache is kept in that case.
    pub fn recompute_critically_damped(&mut self, config: FilterConfig) -> Result<&FilteredSignalSet> {
        let (channels, fs) = (&self.channels, self.fs);
        self.filtered
            .recompute(config, |cfg| filter_critically_damped(channels, fs, cfg))
    }

    /// The cached filtered set, if computed.
    #[must_use]
    pub fn filtered(&self) -> Option<&FilteredSignalSet> {
        self.filtered.value()
    }

    /// Drop the cached filtered set.
    pub fn invalidate_filtered(&mut self) {
        self.filtered.invalidate();
    }

    /// Reference Butterworth filtering of every channel.
    ///
    /// Order is `config.filter_passes` and the cutoff is normalized to
    /// Nyquist. Independent of the critically damped cache.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or channels too short to
    /// filter.
    pub fn classic_butterworth(&self, config: FilterConfig) -> Result<FilteredSignalSet> {
        config.validate(self.fs)?;
        let coefficients =
            butterworth_coefficients(config.filter_passes, config.normalized_cutoff(self.fs))?;
        debug!(
            order = config.filter_passes,
            cutoff = config.cutoff_frequency,
            channels = self.channels.len(),
            "Butterworth reference filtering"
        );
        let channels = apply(&self.channels, &coefficients)?;
        Ok(FilteredSignalSet {
            config,
            coefficients,
            channels,
        })
    }

    /// Raw, filtered and optionally Butterworth-filtered data per channel.
    ///
    /// Filters lazily with `config` under the same cache rules as
    /// [`Self::critically_damped`].
    ///
    /// # Errors
    ///
    /// Propagates errors from filtering.
    pub fn comparison(&mut self, config: FilterConfig, include_butterworth: bool) -> Result<FilterComparison> {
        let butterworth = if include_butterworth {
            Some(self.classic_butterworth(config)?)
        } else {
            None
        };
        let damped = self.critically_damped(config)?.clone();

        let channels = self
            .channels
            .iter()
            .zip(damped.channels)
            .enumerate()
            .map(|(i, (raw, filtered))| ChannelComparison {
                name: raw.name.clone(),
                raw: raw.samples.clone(),
                damped: filtered.samples,
                butterworth: butterworth
                    .as_ref()
                    .map(|b| b.channels[i].samples.clone()),
            })
            .collect();

        Ok(FilterComparison {
            time: self.time(),
            channels,
        })
    }
}

fn filter_critically_damped(
    channels: &[Channel],
    fs: f64,
    config: &FilterConfig,
) -> Result<FilteredSignalSet> {
    config.validate(fs)?;
    let coefficients =
        critically_damped_coefficients(config.filter_passes, config.cutoff_frequency, fs)?;
    debug!(
        passes = config.filter_passes,
        cutoff = config.cutoff_frequency,
        channels = channels.len(),
        "critically damped filtering"
    );
    let channels = apply(channels, &coefficients)?;
    Ok(FilteredSignalSet {
        config: *config,
        coefficients,
        channels,
    })
}

fn apply(channels: &[Channel], coefficients: &FilterCoefficients) -> Result<Vec<Channel>> {
    channels
        .iter()
        .map(|channel| {
            trace!(channel = %channel.name, "filtering channel");
            Ok(Channel {
                name: channel.name.clone(),
                samples: filtfilt(coefficients, &channel.samples)?,
            })
        })
        .collect()
}

fn find_channel<'a>(channels: &'a [Channel], name: &str) -> Option<&'a [f64]> {
    channels
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.samples.as_slice())
}

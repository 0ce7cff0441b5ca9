//! Parameter-keyed memoization of derived results.
//!
//! [`Memo`] holds at most one computed value together with the parameters
//! that produced it. Owners decide through [`RecomputePolicy`] whether a
//! lazy request with different parameters overwrites the cached value or is
//! rejected.

use std::fmt::Debug;

use tracing::{debug, warn};

use crate::error::{PostureError, Result};

/// What a lazy request does when the cache holds other parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputePolicy {
    /// Return [`PostureError::CacheConflict`].
    Reject,
    /// Replace the cached value.
    Overwrite,
}

/// A single cached value keyed by the parameters that produced it.
#[derive(Debug, Clone)]
pub struct Memo<P, T> {
    entry: Option<(P, T)>,
}

impl<P, T> Default for Memo<P, T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<P: PartialEq + Debug, T> Memo<P, T> {
    /// Create an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// Whether a value has been computed.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.entry.is_some()
    }

    /// Parameters of the cached value.
    #[must_use]
    pub fn params(&self) -> Option<&P> {
        self.entry.as_ref().map(|(p, _)| p)
    }

    /// The cached value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.entry.as_ref().map(|(_, v)| v)
    }

    /// Drop the cached value.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("cache invalidated");
        }
    }

    /// Return the cached value for `params`, computing it if absent.
    ///
    /// # Errors
    ///
    /// Propagates errors from `compute`, and returns
    /// [`PostureError::CacheConflict`] when the cache holds other parameters
    /// under [`RecomputePolicy::Reject`].
    pub fn get_or_try_compute<F>(&mut self, params: P, policy: RecomputePolicy, compute: F) -> Result<&T>
    where
        F: FnOnce(&P) -> Result<T>,
    {
        let entry = match self.entry.take() {
            None => {
                let value = compute(&params)?;
                (params, value)
            }
            Some((cached, value)) if cached == params => (cached, value),
            Some((cached, value)) => match policy {
                RecomputePolicy::Reject => {
                    warn!(?cached, requested = ?params, "cached result holds other parameters");
                    let err = PostureError::cache_conflict(
                        format!("{cached:?}"),
                        format!("{params:?}"),
                    );
                    self.entry = Some((cached, value));
                    return Err(err);
                }
                RecomputePolicy::Overwrite => match compute(&params) {
                    Ok(fresh) => (params, fresh),
                    Err(err) => {
                        self.entry = Some((cached, value));
                        return Err(err);
                    }
                },
            },
        };

        let (_, value) = &*self.entry.insert(entry);
        Ok(value)
    }

    /// Compute and store a value for `params`, replacing any cached one.
    ///
    /// The previous value is kept if `compute` fails.
    ///
    /// # Errors
    ///
    /// Propagates errors from `compute`.
    pub fn recompute<F>(&mut self, params: P, compute: F) -> Result<&T>
    where
        F: FnOnce(&P) -> Result<T>,
    {
        let value = compute(&params)?;
        let (_, value) = &*self.entry.insert((params, value));
        Ok(value)
    }
}

//! Line styles accepted by the drawing collaborators.

use std::fmt;
use std::str::FromStr;

use crate::error::PostureError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Line style of a drawn path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineStyle {
    /// `-`
    #[default]
    Solid,
    /// `--`
    Dashed,
    /// `-.`
    DashDot,
    /// `:`
    Dotted,
}

impl LineStyle {
    /// All styles, in selector order.
    pub const ALL: [Self; 4] = [Self::Solid, Self::Dashed, Self::DashDot, Self::Dotted];

    /// Short selector string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "-",
            Self::Dashed => "--",
            Self::DashDot => "-.",
            Self::Dotted => ":",
        }
    }
}

impl FromStr for LineStyle {
    type Err = PostureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| PostureError::unsupported_option("path style", s))
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Match tiers derived from the presence ratio

use crate::ClassifierError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Poster likelihood bucket. Only `Top` images go on to OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Low,
    Medium,
    Top,
}

impl MatchTier {
    /// Assign a tier from a presence ratio.
    ///
    /// `force_top` puts every image in `Top`, for exhaustive re-processing.
    #[must_use]
    pub fn assign(presence: f64, thresholds: &TierThresholds, force_top: bool) -> Self {
        if force_top || presence >= thresholds.top {
            MatchTier::Top
        } else if presence >= thresholds.med {
            MatchTier::Medium
        } else {
            MatchTier::Low
        }
    }

    #[must_use]
    pub fn is_candidate(self) -> bool {
        self == MatchTier::Top
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchTier::Low => "low",
            MatchTier::Medium => "medium",
            MatchTier::Top => "top",
        };
        f.write_str(name)
    }
}

/// Presence thresholds in percent; `top` is strictly above `med`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    top: f64,
    med: f64,
}

impl TierThresholds {
    pub fn new(top: f64, med: f64) -> Result<Self, ClassifierError> {
        if !(top.is_finite() && med.is_finite()) {
            return Err(ClassifierError::InvalidThresholds(format!(
                "thresholds must be finite (top={}, med={})",
                top, med
            )));
        }
        if top <= med {
            return Err(ClassifierError::InvalidThresholds(format!(
                "top threshold {} must be greater than med threshold {}",
                top, med
            )));
        }
        Ok(Self { top, med })
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[must_use]
    pub fn med(&self) -> f64 {
        self.med
    }
}

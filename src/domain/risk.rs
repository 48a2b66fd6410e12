//! Risk result types.
//!
//! Represents the outputs of the scorer, the importance decomposer and the
//! timeline interpolator. All of these are derived values and never stored.

use serde::{Deserialize, Serialize};

/// Coarse banding of a risk probability for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - no significant indicators",
            Self::Moderate => "Moderate risk - some contributing factors",
            Self::High => "High risk - several strong contributing factors",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Output of the logistic scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Risk probability (0.0 to 1.0)
    pub probability: f64,

    /// Linear score before the logistic transform
    pub raw_score: f64,
}

impl RiskResult {
    /// Build a result from a raw linear score.
    ///
    /// The clamp guards non-finite scores: `NaN` maps to 0.0.
    #[must_use]
    pub fn from_raw_score(raw_score: f64) -> Self {
        let p = 1.0 / (1.0 + (-raw_score).exp());
        let probability = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        Self {
            probability,
            raw_score,
        }
    }

    /// Get the risk level based on probability thresholds.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        if self.probability < 0.3 {
            RiskLevel::Low
        } else if self.probability < 0.7 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

/// One feature's share of a score under the local linear attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceEntry {
    /// Derived feature name
    pub feature: String,

    /// Signed `weight * value` term
    pub raw_contribution: f64,

    /// `|raw| / Σ|raw|` as a rounded percentage (0-100)
    pub share_percent: u8,
}

/// Risk at one step of a scenario blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub step: usize,
    pub risk: f64,
}

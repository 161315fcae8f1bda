//! Asset criticality calculation.
//!
//! Criticality blends the average of an asset's five security-dimension
//! scores with a normalized economic-value factor. Economic value is capped
//! against a configurable reference ceiling so that monetary value alone
//! can never force maximum criticality.

use serde::{Deserialize, Serialize};

use mg_core::config::CriticalityWeights;
use mg_core::models::asset::Asset;

/// Four-level criticality label. Ordering follows severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CriticalityLabel {
    Low,
    Medium,
    High,
    Critical,
}

impl CriticalityLabel {
    /// Labels a clamped [0, 10] criticality score.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            CriticalityLabel::Critical
        } else if score >= 6.0 {
            CriticalityLabel::High
        } else if score >= 4.0 {
            CriticalityLabel::Medium
        } else {
            CriticalityLabel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalityLabel::Low => "low",
            CriticalityLabel::Medium => "medium",
            CriticalityLabel::High => "high",
            CriticalityLabel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for CriticalityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriticalityLabel::Low => write!(f, "Low"),
            CriticalityLabel::Medium => write!(f, "Medium"),
            CriticalityLabel::High => write!(f, "High"),
            CriticalityLabel::Critical => write!(f, "Critical"),
        }
    }
}

/// A computed criticality for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalityScore {
    /// Blended score, clamped to [0, 10].
    pub score: f64,
    /// Label for the score.
    pub label: CriticalityLabel,
    /// Arithmetic mean of the five security-dimension scores.
    pub average_valuation: f64,
    /// Normalized economic factor in [0, 10].
    pub economic_factor: f64,
}

/// Computes an asset's criticality from its valuation and economic value.
///
/// Pure function: no side effects, identical input always yields identical
/// output.
pub fn compute_criticality(asset: &Asset, weights: &CriticalityWeights) -> CriticalityScore {
    let average_valuation = asset.valuation.average();
    let economic_factor = (asset.economic_value / weights.economic_ceiling).min(1.0) * 10.0;

    let blended =
        weights.dimension_weight * average_valuation + weights.economic_weight * economic_factor;
    let score = blended.clamp(0.0, 10.0);

    CriticalityScore {
        score,
        label: CriticalityLabel::from_score(score),
        average_valuation,
        economic_factor,
    }
}

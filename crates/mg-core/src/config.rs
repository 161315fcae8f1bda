//! Engine configuration.
//!
//! All tunables recognized by the engine: the criticality weight split, the
//! economic-value normalization ceiling, risk-level thresholds, and trend
//! window lengths. The defaults match the documented MAGERIT profile used
//! throughout the test suite.

use serde::{Deserialize, Serialize};

/// Configurable weights for the criticality blend.
///
/// `dimension_weight` and `economic_weight` should sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalityWeights {
    /// Weight for the security-dimension average (default: 0.70).
    pub dimension_weight: f64,
    /// Weight for the normalized economic-value factor (default: 0.30).
    pub economic_weight: f64,
    /// Reference ceiling for economic-value normalization. Monetary value is
    /// capped against this ceiling so no single asset's value alone can
    /// force maximum criticality (default: 50 000).
    pub economic_ceiling: f64,
}

impl Default for CriticalityWeights {
    fn default() -> Self {
        Self {
            dimension_weight: 0.70,
            economic_weight: 0.30,
            economic_ceiling: 50_000.0,
        }
    }
}

impl CriticalityWeights {
    /// Validates that weights are non-negative, sum to approximately 1.0,
    /// and the ceiling is positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension_weight < 0.0 || self.economic_weight < 0.0 {
            return Err("all weights must be non-negative".to_string());
        }
        let total = self.dimension_weight + self.economic_weight;
        if (total - 1.0).abs() > 0.01 {
            return Err(format!(
                "weights must sum to approximately 1.0, got {}",
                total
            ));
        }
        if self.economic_ceiling <= 0.0 {
            return Err(format!(
                "economic ceiling must be positive, got {}",
                self.economic_ceiling
            ));
        }
        Ok(())
    }
}

/// Score cutoffs for the 5-level risk classification.
///
/// A score is classified against the cutoffs top-down: `>= critical` is
/// Critical, `>= high` is High, and so on; below `low` is Very Low. The
/// criticality label uses the same `critical`/`high`/`medium` cutoffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 8.0,
            high: 6.0,
            medium: 4.0,
            low: 2.0,
        }
    }
}

impl RiskThresholds {
    /// Validates that the cutoffs are strictly descending within [0, 10].
    pub fn validate(&self) -> Result<(), String> {
        let ordered = self.critical > self.high && self.high > self.medium && self.medium > self.low;
        if !ordered {
            return Err("thresholds must be strictly descending".to_string());
        }
        if self.critical > 10.0 || self.low < 0.0 {
            return Err("thresholds must lie within [0, 10]".to_string());
        }
        Ok(())
    }
}

/// Window lengths for dashboard trend series, in days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendWindows {
    pub short_days: u32,
    pub medium_days: u32,
    pub long_days: u32,
}

impl Default for TrendWindows {
    fn default() -> Self {
        Self {
            short_days: 7,
            medium_days: 30,
            long_days: 90,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Criticality weight split and economic normalization.
    #[serde(default)]
    pub criticality: CriticalityWeights,
    /// Risk-level classification cutoffs.
    #[serde(default)]
    pub thresholds: RiskThresholds,
    /// Trend window lengths.
    #[serde(default)]
    pub trend_windows: TrendWindows,
}

impl EngineConfig {
    /// Validates every tunable section.
    pub fn validate(&self) -> Result<(), String> {
        self.criticality.validate()?;
        self.thresholds.validate()?;
        Ok(())
    }
}

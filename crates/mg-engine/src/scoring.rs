//! Core risk scoring functions.
//!
//! Pure, deterministic computations: inherent risk from likelihood and
//! impact, combined safeguard effectiveness, residual risk, and the
//! five-level classification. Invalid numeric input fails with
//! `InvalidRange`; nothing is ever silently clamped.

use serde::{Deserialize, Serialize};

use mg_core::config::RiskThresholds;
use mg_core::error::EngineError;
use mg_core::models::risk::RiskLevel;

/// Computes inherent risk as `likelihood × impact / 10`.
///
/// Both inputs range [1, 10], so the product ranges [1, 100] and the
/// result [0.1, 10]. Monotonically non-decreasing in each argument.
pub fn compute_inherent_risk(likelihood: f64, impact: f64) -> Result<f64, EngineError> {
    if !(1.0..=10.0).contains(&likelihood) {
        return Err(EngineError::InvalidRange {
            field: "likelihood",
            value: likelihood,
            min: 1.0,
            max: 10.0,
        });
    }
    if !(1.0..=10.0).contains(&impact) {
        return Err(EngineError::InvalidRange {
            field: "impact",
            value: impact,
            min: 1.0,
            max: 10.0,
        });
    }
    Ok(likelihood * impact / 10.0)
}

/// Combines independent safeguard effectiveness fractions via
/// `1 − Π(1 − eᵢ)`.
///
/// Naive summation could exceed 100%; the product form models diminishing
/// marginal benefit of stacking controls. Redundant controls reduce but
/// never eliminate exposure: the result is strictly below 1 unless some
/// `eᵢ = 1`. An empty list is the valid zero-mitigation case and yields 0.
pub fn combine_safeguard_effectiveness(effectiveness: &[f64]) -> Result<f64, EngineError> {
    let mut remaining_exposure = 1.0;
    for &e in effectiveness {
        if !(0.0..=1.0).contains(&e) {
            return Err(EngineError::InvalidRange {
                field: "effectiveness",
                value: e,
                min: 0.0,
                max: 1.0,
            });
        }
        remaining_exposure *= 1.0 - e;
    }
    Ok(1.0 - remaining_exposure)
}

/// Computes residual risk as `inherent × (1 − combined)`, floored at 0.
pub fn compute_residual_risk(
    inherent_risk: f64,
    combined_effectiveness: f64,
) -> Result<f64, EngineError> {
    if inherent_risk < 0.0 {
        return Err(EngineError::InvalidRange {
            field: "inherent_risk",
            value: inherent_risk,
            min: 0.0,
            max: 10.0,
        });
    }
    if !(0.0..=1.0).contains(&combined_effectiveness) {
        return Err(EngineError::InvalidRange {
            field: "combined_effectiveness",
            value: combined_effectiveness,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok((inherent_risk * (1.0 - combined_effectiveness)).max(0.0))
}

/// Classifies a risk score with the default thresholds (8/6/4/2).
pub fn classify_risk_level(score: f64) -> RiskLevel {
    classify_risk_level_with(score, &RiskThresholds::default())
}

/// Classifies a risk score against configurable thresholds.
///
/// For risk records the classification is driven by **residual** risk, the
/// operationally meaningful post-mitigation exposure.
pub fn classify_risk_level_with(score: f64, thresholds: &RiskThresholds) -> RiskLevel {
    if score >= thresholds.critical {
        RiskLevel::Critical
    } else if score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.medium {
        RiskLevel::Medium
    } else if score >= thresholds.low {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    }
}

/// One likelihood/impact pairing for a mitigation simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MitigationScenario {
    pub likelihood: f64,
    pub impact: f64,
}

/// Result of simulating a safeguard against a set of scenarios.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MitigationSimulation {
    /// Mean inherent risk across the scenarios.
    pub original_risk: f64,
    /// Mean risk after applying the safeguard's effectiveness.
    pub mitigated_risk: f64,
    /// Absolute risk reduction.
    pub risk_reduction: f64,
    /// Risk reduction per monetary unit of implementation cost. `None`
    /// when the cost is zero.
    pub cost_effectiveness: Option<f64>,
}

/// Simulates applying a single safeguard to a set of risk scenarios.
pub fn simulate_mitigation(
    scenarios: &[MitigationScenario],
    effectiveness_fraction: f64,
    implementation_cost: f64,
) -> Result<MitigationSimulation, EngineError> {
    if scenarios.is_empty() {
        return Err(EngineError::Validation(
            "at least one scenario is required".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&effectiveness_fraction) {
        return Err(EngineError::InvalidRange {
            field: "effectiveness",
            value: effectiveness_fraction,
            min: 0.0,
            max: 1.0,
        });
    }

    let mut total = 0.0;
    for scenario in scenarios {
        total += compute_inherent_risk(scenario.likelihood, scenario.impact)?;
    }
    let original_risk = total / scenarios.len() as f64;
    let mitigated_risk = original_risk * (1.0 - effectiveness_fraction);
    let risk_reduction = original_risk - mitigated_risk;
    let cost_effectiveness = if implementation_cost > 0.0 {
        Some(risk_reduction / implementation_cost)
    } else {
        None
    };

    Ok(MitigationSimulation {
        original_risk,
        mitigated_risk,
        risk_reduction,
        cost_effectiveness,
    })
}

//! Threat coverage analysis.
//!
//! A threat is covered when at least one mitigation-contributing safeguard
//! (Implemented or Operational) lists it among its controlled threats. The
//! analyzer reports the coverage percentage and the gap list with an
//! implied severity per uncovered threat.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mg_core::models::risk::RiskLevel;
use mg_core::models::safeguard::Safeguard;
use mg_core::models::threat::Threat;

use crate::scoring::classify_risk_level;

/// A threat with no contributing safeguard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncoveredThreat {
    pub threat_id: Uuid,
    pub code: String,
    pub name: String,
    pub likelihood: f64,
    /// Severity implied by the threat's raw likelihood, classified with the
    /// standard 5-level thresholds. A documented simplification: no asset
    /// or impact context is bound at this stage, so likelihood stands in
    /// for an impact-less severity signal.
    pub implied_risk_level: RiskLevel,
}

/// Result of a coverage evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_threats: usize,
    pub covered_threats: usize,
    /// `covered / total × 100`. Defined as 100 when there are no threats:
    /// an empty catalog is vacuously fully covered, and the division by
    /// zero never happens.
    pub coverage_percentage: f64,
    /// Gaps, highest likelihood first (ties broken by code).
    pub uncovered_threats: Vec<UncoveredThreat>,
    /// Deterministic advisory strings derived from the gap list.
    pub recommendations: Vec<String>,
}

/// Evaluates what fraction of the known threats have at least one
/// operational safeguard, and lists the gaps.
pub fn evaluate_coverage(threats: &[Threat], safeguards: &[Safeguard]) -> CoverageReport {
    let contributing: Vec<&Safeguard> = safeguards
        .iter()
        .filter(|s| s.contributes_mitigation())
        .collect();

    let mut uncovered: Vec<UncoveredThreat> = threats
        .iter()
        .filter(|threat| !contributing.iter().any(|s| s.controls_threat(threat.id)))
        .map(|threat| UncoveredThreat {
            threat_id: threat.id,
            code: threat.code.clone(),
            name: threat.name.clone(),
            likelihood: threat.likelihood,
            implied_risk_level: classify_risk_level(threat.likelihood),
        })
        .collect();

    uncovered.sort_by(|a, b| {
        b.likelihood
            .total_cmp(&a.likelihood)
            .then_with(|| a.code.cmp(&b.code))
    });

    let total_threats = threats.len();
    let covered_threats = total_threats - uncovered.len();
    let coverage_percentage = if total_threats == 0 {
        100.0
    } else {
        covered_threats as f64 / total_threats as f64 * 100.0
    };

    let recommendations = build_recommendations(coverage_percentage, &uncovered);

    CoverageReport {
        total_threats,
        covered_threats,
        coverage_percentage,
        uncovered_threats: uncovered,
        recommendations,
    }
}

/// Advisory strings for the gap list, highest-likelihood threats first.
fn build_recommendations(coverage_percentage: f64, uncovered: &[UncoveredThreat]) -> Vec<String> {
    let mut recommendations = Vec::new();

    for gap in uncovered.iter().take(3) {
        recommendations.push(format!(
            "Threat {} ({}) has no operational safeguard; implied severity is {} at \
             likelihood {:.1}.",
            gap.code, gap.name, gap.implied_risk_level, gap.likelihood
        ));
    }

    if coverage_percentage < 50.0 && !uncovered.is_empty() {
        recommendations.push(format!(
            "Coverage is at {coverage_percentage:.0}%; prioritize a safeguard implementation \
             plan for the {} uncovered threats.",
            uncovered.len()
        ));
    }

    recommendations
}

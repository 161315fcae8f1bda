//! End-to-end risk calculation against the catalog.
//!
//! [`RiskCalculator`] resolves references through the repository
//! collaborators, filters safeguards to mitigation-contributing statuses,
//! and produces both risk figures, both level labels, and rule-based
//! advisory recommendations. Recommendation generation is deterministic:
//! the same inputs always produce the same strings in the same order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use mg_core::config::RiskThresholds;
use mg_core::error::EngineError;
use mg_core::models::risk::{RiskLevel, RiskRecord, TreatmentStrategy};
use mg_core::models::safeguard::Safeguard;
use mg_core::repo::{AssetRepository, SafeguardRepository, ThreatRepository};

use crate::scoring::{
    classify_risk_level_with, combine_safeguard_effectiveness, compute_inherent_risk,
    compute_residual_risk,
};

/// A one-shot risk calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCalculationRequest {
    pub asset_id: Uuid,
    pub threat_id: Uuid,
    #[serde(default)]
    pub vulnerability_id: Option<Uuid>,
    /// Likelihood estimate, in [1, 10].
    pub likelihood: f64,
    /// Impact estimate, in [1, 10].
    pub impact: f64,
    /// Safeguards to consider; non-contributing statuses are filtered out.
    #[serde(default)]
    pub safeguard_ids: Vec<Uuid>,
    /// Intended treatment strategy, if already chosen.
    #[serde(default)]
    pub treatment: Option<TreatmentStrategy>,
}

/// Result of an end-to-end risk calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCalculationOutcome {
    pub inherent_risk: f64,
    pub residual_risk: f64,
    pub inherent_level: RiskLevel,
    pub residual_level: RiskLevel,
    /// Combined effectiveness fraction of the contributing safeguards.
    pub combined_effectiveness: f64,
    /// Number of safeguards that actually contributed mitigation.
    pub contributing_safeguards: usize,
    /// Deterministic advisory recommendations.
    pub recommendations: Vec<String>,
}

/// Engine-computed derived values for a risk record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRisk {
    pub inherent_risk: f64,
    pub residual_risk: f64,
    pub risk_level: RiskLevel,
}

/// Repo-backed risk calculator.
///
/// Stateless apart from its collaborator handles; safe to share across
/// concurrent callers.
pub struct RiskCalculator {
    assets: Arc<dyn AssetRepository>,
    threats: Arc<dyn ThreatRepository>,
    safeguards: Arc<dyn SafeguardRepository>,
    thresholds: RiskThresholds,
}

impl RiskCalculator {
    /// Creates a calculator with default classification thresholds.
    pub fn new(
        assets: Arc<dyn AssetRepository>,
        threats: Arc<dyn ThreatRepository>,
        safeguards: Arc<dyn SafeguardRepository>,
    ) -> Self {
        Self::with_thresholds(assets, threats, safeguards, RiskThresholds::default())
    }

    /// Creates a calculator with custom classification thresholds.
    pub fn with_thresholds(
        assets: Arc<dyn AssetRepository>,
        threats: Arc<dyn ThreatRepository>,
        safeguards: Arc<dyn SafeguardRepository>,
        thresholds: RiskThresholds,
    ) -> Self {
        Self {
            assets,
            threats,
            safeguards,
            thresholds,
        }
    }

    /// Calculates inherent and residual risk for a one-shot request.
    ///
    /// Fails with `NotFound` if the asset or threat reference does not
    /// resolve, `DanglingReference` for an unresolvable safeguard, and
    /// `InvalidRange` for out-of-domain numeric input. An empty safeguard
    /// list is the valid zero-mitigation case.
    #[instrument(skip(self), fields(asset_id = %request.asset_id, threat_id = %request.threat_id))]
    pub async fn calculate(
        &self,
        request: &RiskCalculationRequest,
    ) -> Result<RiskCalculationOutcome, EngineError> {
        if self.assets.get(request.asset_id).await?.is_none() {
            return Err(EngineError::NotFound {
                entity: "asset",
                id: request.asset_id.to_string(),
            });
        }
        if self.threats.get(request.threat_id).await?.is_none() {
            return Err(EngineError::NotFound {
                entity: "threat",
                id: request.threat_id.to_string(),
            });
        }

        let resolved = self.resolve_safeguards(&request.safeguard_ids).await?;
        let contributing: Vec<&Safeguard> = resolved
            .iter()
            .filter(|s| s.contributes_mitigation())
            .collect();

        let inherent_risk = compute_inherent_risk(request.likelihood, request.impact)?;
        let fractions: Vec<f64> = contributing
            .iter()
            .map(|s| s.effectiveness_fraction())
            .collect();
        let combined_effectiveness = combine_safeguard_effectiveness(&fractions)?;
        let residual_risk = compute_residual_risk(inherent_risk, combined_effectiveness)?;

        let inherent_level = classify_risk_level_with(inherent_risk, &self.thresholds);
        let residual_level = classify_risk_level_with(residual_risk, &self.thresholds);

        let recommendations = build_recommendations(
            inherent_level,
            residual_level,
            contributing.len(),
            request.treatment,
        );

        debug!(
            inherent_risk,
            residual_risk,
            contributing = contributing.len(),
            "risk calculation complete"
        );

        Ok(RiskCalculationOutcome {
            inherent_risk,
            residual_risk,
            inherent_level,
            residual_level,
            combined_effectiveness,
            contributing_safeguards: contributing.len(),
            recommendations,
        })
    }

    /// Recomputes the derived fields for an existing record from its
    /// *current* asset/threat/safeguard references.
    ///
    /// Unresolvable references surface as `DanglingReference`, which bulk
    /// passes record per item rather than aborting.
    pub async fn evaluate_record(&self, record: &RiskRecord) -> Result<DerivedRisk, EngineError> {
        if self.assets.get(record.asset_id).await?.is_none() {
            return Err(EngineError::DanglingReference {
                entity: "asset",
                id: record.asset_id.to_string(),
            });
        }
        if self.threats.get(record.threat_id).await?.is_none() {
            return Err(EngineError::DanglingReference {
                entity: "threat",
                id: record.threat_id.to_string(),
            });
        }

        let resolved = self.resolve_safeguards(&record.safeguard_ids).await?;
        let fractions: Vec<f64> = resolved
            .iter()
            .filter(|s| s.contributes_mitigation())
            .map(|s| s.effectiveness_fraction())
            .collect();

        let inherent_risk = compute_inherent_risk(record.likelihood, record.impact)?;
        let combined = combine_safeguard_effectiveness(&fractions)?;
        let residual_risk = compute_residual_risk(inherent_risk, combined)?;
        let risk_level = classify_risk_level_with(residual_risk, &self.thresholds);

        Ok(DerivedRisk {
            inherent_risk,
            residual_risk,
            risk_level,
        })
    }

    async fn resolve_safeguards(&self, ids: &[Uuid]) -> Result<Vec<Safeguard>, EngineError> {
        let mut resolved = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.safeguards.get(id).await? {
                Some(safeguard) => resolved.push(safeguard),
                None => {
                    return Err(EngineError::DanglingReference {
                        entity: "safeguard",
                        id: id.to_string(),
                    })
                }
            }
        }
        Ok(resolved)
    }
}

/// Rule-based recommendation generation. Deterministic: rules are checked
/// in a fixed order and emit fixed phrasing.
fn build_recommendations(
    inherent_level: RiskLevel,
    residual_level: RiskLevel,
    contributing_safeguards: usize,
    treatment: Option<TreatmentStrategy>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if contributing_safeguards == 0 && inherent_level >= RiskLevel::High {
        recommendations.push(format!(
            "No operational safeguards applied despite {inherent_level} inherent risk; \
             implement at least one preventive or corrective control."
        ));
    }

    if residual_level == RiskLevel::Critical {
        recommendations.push(
            "Residual risk remains Critical; current safeguards are insufficient and the risk \
             requires immediate treatment."
                .to_string(),
        );
    }

    match treatment {
        Some(TreatmentStrategy::Accept) if residual_level >= RiskLevel::High => {
            recommendations.push(format!(
                "Treatment strategy 'accept' is inconsistent with a {residual_level} residual \
                 risk level; consider mitigation or transfer."
            ));
        }
        Some(TreatmentStrategy::Avoid) if residual_level <= RiskLevel::Low => {
            recommendations.push(format!(
                "Treatment strategy 'avoid' may be disproportionate for a {residual_level} \
                 residual risk level; acceptance could be adequate."
            ));
        }
        _ => {}
    }

    if contributing_safeguards > 0 && residual_level >= RiskLevel::High {
        recommendations.push(
            "Applied safeguards leave substantial residual exposure; stack additional \
             independent controls or increase effectiveness of existing ones."
                .to_string(),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_core::models::asset::{Asset, CreateAssetRequest, SecurityValuation};
    use mg_core::models::safeguard::{
        CreateSafeguardRequest, SafeguardKind, SafeguardStatus,
    };
    use mg_core::models::threat::{CreateThreatRequest, Threat, ThreatCategory, ThreatOrigin};
    use mg_core::repo::{
        InMemoryAssetRepository, InMemorySafeguardRepository, InMemoryThreatRepository,
    };

    fn sample_asset() -> Asset {
        Asset::from_request(CreateAssetRequest {
            code: "ACT-001".to_string(),
            name: "Mail service".to_string(),
            asset_type: "Service".to_string(),
            category: String::new(),
            owner: String::new(),
            custodian: String::new(),
            location: String::new(),
            valuation: SecurityValuation::uniform(7.0),
            economic_value: 10_000.0,
            dependencies: vec![],
        })
    }

    fn sample_threat() -> Threat {
        Threat::from_request(CreateThreatRequest {
            code: "AME-014".to_string(),
            name: "Phishing campaign".to_string(),
            description: String::new(),
            category: ThreatCategory::Human,
            origin: ThreatOrigin::External,
            likelihood: 7.0,
        })
    }

    fn sample_safeguard(effectiveness: f64, status: SafeguardStatus) -> Safeguard {
        Safeguard::from_request(CreateSafeguardRequest {
            code: format!("SAL-{effectiveness}"),
            name: "Control".to_string(),
            kind: SafeguardKind::Preventive,
            dimensions: vec![],
            controlled_threats: vec![],
            protected_assets: vec![],
            effectiveness,
            status,
            implementation_cost: 0.0,
            maintenance_cost: 0.0,
        })
    }

    struct Fixture {
        calculator: RiskCalculator,
        asset: Asset,
        threat: Threat,
        safeguards: Arc<InMemorySafeguardRepository>,
    }

    async fn fixture_with_safeguards(safeguards: Vec<Safeguard>) -> Fixture {
        let asset = sample_asset();
        let threat = sample_threat();
        let assets = Arc::new(InMemoryAssetRepository::with_assets(vec![asset.clone()]));
        let threats = Arc::new(InMemoryThreatRepository::with_threats(vec![threat.clone()]));
        let safeguard_repo = Arc::new(InMemorySafeguardRepository::with_safeguards(safeguards));
        let calculator = RiskCalculator::new(assets, threats, safeguard_repo.clone());
        Fixture {
            calculator,
            asset,
            threat,
            safeguards: safeguard_repo,
        }
    }

    fn request(fixture: &Fixture, safeguard_ids: Vec<Uuid>) -> RiskCalculationRequest {
        RiskCalculationRequest {
            asset_id: fixture.asset.id,
            threat_id: fixture.threat.id,
            vulnerability_id: None,
            likelihood: 7.0,
            impact: 8.0,
            safeguard_ids,
            treatment: None,
        }
    }

    #[tokio::test]
    async fn test_calculate_without_safeguards() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let outcome = fixture
            .calculator
            .calculate(&request(&fixture, vec![]))
            .await
            .unwrap();

        assert_eq!(outcome.inherent_risk, 5.6);
        assert_eq!(outcome.residual_risk, 5.6);
        assert_eq!(outcome.inherent_level, RiskLevel::Medium);
        assert_eq!(outcome.residual_level, RiskLevel::Medium);
        assert_eq!(outcome.contributing_safeguards, 0);
    }

    #[tokio::test]
    async fn test_calculate_with_operational_safeguards() {
        let first = sample_safeguard(60.0, SafeguardStatus::Operational);
        let second = sample_safeguard(40.0, SafeguardStatus::Operational);
        let ids = vec![first.id, second.id];
        let fixture = fixture_with_safeguards(vec![first, second]).await;

        let outcome = fixture
            .calculator
            .calculate(&request(&fixture, ids))
            .await
            .unwrap();

        assert!((outcome.combined_effectiveness - 0.76).abs() < 1e-9);
        assert!((outcome.residual_risk - 1.344).abs() < 1e-9);
        assert_eq!(outcome.residual_level, RiskLevel::VeryLow);
        assert_eq!(outcome.contributing_safeguards, 2);
    }

    #[tokio::test]
    async fn test_non_contributing_statuses_filtered() {
        let planned = sample_safeguard(90.0, SafeguardStatus::Planned);
        let obsolete = sample_safeguard(95.0, SafeguardStatus::Obsolete);
        let in_progress = sample_safeguard(80.0, SafeguardStatus::InImplementation);
        let ids = vec![planned.id, obsolete.id, in_progress.id];
        let fixture = fixture_with_safeguards(vec![planned, obsolete, in_progress]).await;

        let outcome = fixture
            .calculator
            .calculate(&request(&fixture, ids))
            .await
            .unwrap();

        // Stated effectiveness is irrelevant outside contributing statuses.
        assert_eq!(outcome.combined_effectiveness, 0.0);
        assert_eq!(outcome.residual_risk, outcome.inherent_risk);
        assert_eq!(outcome.contributing_safeguards, 0);
    }

    #[tokio::test]
    async fn test_unknown_asset_is_not_found() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let mut req = request(&fixture, vec![]);
        req.asset_id = Uuid::new_v4();

        let result = fixture.calculator.calculate(&req).await;
        assert!(matches!(
            result,
            Err(EngineError::NotFound { entity: "asset", .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_threat_is_not_found() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let mut req = request(&fixture, vec![]);
        req.threat_id = Uuid::new_v4();

        let result = fixture.calculator.calculate(&req).await;
        assert!(matches!(
            result,
            Err(EngineError::NotFound { entity: "threat", .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_safeguard_is_dangling() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let req = request(&fixture, vec![Uuid::new_v4()]);

        let result = fixture.calculator.calculate(&req).await;
        assert!(matches!(
            result,
            Err(EngineError::DanglingReference { entity: "safeguard", .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_likelihood_rejected() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let mut req = request(&fixture, vec![]);
        req.likelihood = 0.0;

        let result = fixture.calculator.calculate(&req).await;
        assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn test_recommendation_no_safeguards_high_inherent() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let mut req = request(&fixture, vec![]);
        req.likelihood = 10.0;
        req.impact = 9.0;

        let outcome = fixture.calculator.calculate(&req).await.unwrap();
        assert_eq!(outcome.inherent_level, RiskLevel::Critical);
        assert!(outcome
            .recommendations
            .iter()
            .any(|r| r.contains("No operational safeguards")));
    }

    #[tokio::test]
    async fn test_recommendation_accept_inconsistent() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let mut req = request(&fixture, vec![]);
        req.likelihood = 9.0;
        req.impact = 8.0;
        req.treatment = Some(TreatmentStrategy::Accept);

        let outcome = fixture.calculator.calculate(&req).await.unwrap();
        assert!(outcome
            .recommendations
            .iter()
            .any(|r| r.contains("inconsistent")));
    }

    #[tokio::test]
    async fn test_recommendations_deterministic() {
        let fixture = fixture_with_safeguards(vec![]).await;
        let mut req = request(&fixture, vec![]);
        req.likelihood = 9.0;
        req.impact = 9.0;

        let first = fixture.calculator.calculate(&req).await.unwrap();
        let second = fixture.calculator.calculate(&req).await.unwrap();
        assert_eq!(first.recommendations, second.recommendations);
    }

    #[tokio::test]
    async fn test_evaluate_record_dangling_safeguard() {
        use mg_core::models::risk::CreateRiskRequest;

        let fixture = fixture_with_safeguards(vec![]).await;
        let record = RiskRecord::from_request(CreateRiskRequest {
            code: "RSG-001".to_string(),
            name: "Test".to_string(),
            asset_id: fixture.asset.id,
            threat_id: fixture.threat.id,
            vulnerability_id: None,
            likelihood: 7.0,
            impact: 8.0,
            safeguard_ids: vec![Uuid::new_v4()],
            treatment: TreatmentStrategy::Mitigate,
        });

        let result = fixture.calculator.evaluate_record(&record).await;
        assert!(matches!(
            result,
            Err(EngineError::DanglingReference { entity: "safeguard", .. })
        ));
        // The safeguard repo itself is untouched.
        assert!(fixture.safeguards.list_all().await.unwrap().is_empty());
    }
}

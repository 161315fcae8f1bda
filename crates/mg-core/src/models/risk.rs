//! Risk record data model.
//!
//! A risk record pairs one asset with one threat (optionally through a
//! vulnerability) and carries the likelihood/impact estimate plus the
//! safeguards applied to it. The derived fields (`inherent_risk`,
//! `residual_risk`, `risk_level`) are owned by the scoring engine: they are
//! recomputed from current inputs and written back through
//! [`RiskRecord::apply_derived`], never edited field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Five-level risk classification. Ordering follows severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very_low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::VeryLow => write!(f, "Very Low"),
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// Lifecycle status of a risk record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Identified,
    InAnalysis,
    Treated,
    Accepted,
    Transferred,
}

impl RiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Identified => "identified",
            RiskStatus::InAnalysis => "in_analysis",
            RiskStatus::Treated => "treated",
            RiskStatus::Accepted => "accepted",
            RiskStatus::Transferred => "transferred",
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chosen treatment strategy for a risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStrategy {
    Avoid,
    Mitigate,
    Transfer,
    Accept,
}

impl TreatmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentStrategy::Avoid => "avoid",
            TreatmentStrategy::Mitigate => "mitigate",
            TreatmentStrategy::Transfer => "transfer",
            TreatmentStrategy::Accept => "accept",
        }
    }
}

impl std::fmt::Display for TreatmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One asset/threat risk pairing with its quantification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique, stable business code (e.g., "RSG-003").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// The asset at risk.
    pub asset_id: Uuid,
    /// The threat considered.
    pub threat_id: Uuid,
    /// Optional vulnerability linking asset and threat.
    pub vulnerability_id: Option<Uuid>,
    /// Likelihood estimate for this pairing, in [1, 10].
    pub likelihood: f64,
    /// Impact estimate for this pairing, in [1, 10].
    pub impact: f64,
    /// Safeguards applied to this risk.
    pub safeguard_ids: Vec<Uuid>,
    /// Derived: likelihood × impact / 10. Engine-owned.
    pub inherent_risk: f64,
    /// Derived: inherent risk after combined safeguard effectiveness.
    /// Engine-owned.
    pub residual_risk: f64,
    /// Derived: classification of the residual risk. Engine-owned.
    pub risk_level: RiskLevel,
    /// Lifecycle status.
    pub status: RiskStatus,
    /// Chosen treatment strategy.
    pub treatment: TreatmentStrategy,
    /// Timestamp when the risk was identified.
    pub identified_at: DateTime<Utc>,
    /// Timestamp of the last evaluation of the derived fields.
    pub last_evaluated_at: DateTime<Utc>,
}

impl RiskRecord {
    /// Creates a record from a validated construction request. Derived
    /// fields start at zero/Very Low until the engine evaluates them.
    pub fn from_request(request: CreateRiskRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: request.code,
            name: request.name,
            asset_id: request.asset_id,
            threat_id: request.threat_id,
            vulnerability_id: request.vulnerability_id,
            likelihood: request.likelihood,
            impact: request.impact,
            safeguard_ids: request.safeguard_ids,
            inherent_risk: 0.0,
            residual_risk: 0.0,
            risk_level: RiskLevel::VeryLow,
            status: RiskStatus::Identified,
            treatment: request.treatment,
            identified_at: now,
            last_evaluated_at: now,
        }
    }

    /// Writes back engine-computed derived values. The only mutation path
    /// for `inherent_risk`, `residual_risk`, and `risk_level`.
    pub fn apply_derived(&mut self, inherent_risk: f64, residual_risk: f64, level: RiskLevel) {
        self.inherent_risk = inherent_risk;
        self.residual_risk = residual_risk;
        self.risk_level = level;
        self.last_evaluated_at = Utc::now();
    }

    /// Whether the given derived values differ from the stored ones.
    /// Exact value comparison: the engine is deterministic, so unchanged
    /// inputs reproduce bit-identical outputs.
    pub fn derived_changed(&self, inherent_risk: f64, residual_risk: f64, level: RiskLevel) -> bool {
        self.inherent_risk != inherent_risk
            || self.residual_risk != residual_risk
            || self.risk_level != level
    }
}

/// Validated construction request for a [`RiskRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRiskRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub asset_id: Uuid,
    pub threat_id: Uuid,
    #[serde(default)]
    pub vulnerability_id: Option<Uuid>,
    #[validate(range(min = 1.0, max = 10.0))]
    pub likelihood: f64,
    #[validate(range(min = 1.0, max = 10.0))]
    pub impact: f64,
    #[serde(default)]
    pub safeguard_ids: Vec<Uuid>,
    pub treatment: TreatmentStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateRiskRequest {
        CreateRiskRequest {
            code: "RSG-003".to_string(),
            name: "Phishing against mail service".to_string(),
            asset_id: Uuid::new_v4(),
            threat_id: Uuid::new_v4(),
            vulnerability_id: None,
            likelihood: 7.0,
            impact: 8.0,
            safeguard_ids: vec![],
            treatment: TreatmentStrategy::Mitigate,
        }
    }

    #[test]
    fn test_record_from_request() {
        let record = RiskRecord::from_request(valid_request());
        assert_eq!(record.status, RiskStatus::Identified);
        assert_eq!(record.inherent_risk, 0.0);
        assert_eq!(record.risk_level, RiskLevel::VeryLow);
    }

    #[test]
    fn test_apply_derived() {
        let mut record = RiskRecord::from_request(valid_request());
        record.apply_derived(5.6, 1.344, RiskLevel::Low);
        assert_eq!(record.inherent_risk, 5.6);
        assert_eq!(record.residual_risk, 1.344);
        assert_eq!(record.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_derived_changed() {
        let mut record = RiskRecord::from_request(valid_request());
        record.apply_derived(5.6, 5.6, RiskLevel::Medium);

        assert!(!record.derived_changed(5.6, 5.6, RiskLevel::Medium));
        assert!(record.derived_changed(5.6, 1.344, RiskLevel::Low));
        assert!(record.derived_changed(5.6, 5.6, RiskLevel::High));
    }

    #[test]
    fn test_likelihood_and_impact_ranges() {
        let mut request = valid_request();
        request.likelihood = 0.5;
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.impact = 10.5;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert!(RiskLevel::Low > RiskLevel::VeryLow);
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::VeryLow.to_string(), "Very Low");
        assert_eq!(RiskLevel::Critical.to_string(), "Critical");
        assert_eq!(RiskLevel::Medium.as_str(), "medium");
    }
}

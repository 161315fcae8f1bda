//! Safeguard data model.
//!
//! Safeguards are the controls applied against threats. Only safeguards in
//! the Implemented or Operational status contribute to residual-risk
//! reduction and threat coverage; planned, in-progress, and obsolete
//! safeguards contribute nothing regardless of their stated effectiveness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The kind of control a safeguard provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeguardKind {
    Preventive,
    Detective,
    Corrective,
    Deterrent,
}

impl std::fmt::Display for SafeguardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafeguardKind::Preventive => write!(f, "preventive"),
            SafeguardKind::Detective => write!(f, "detective"),
            SafeguardKind::Corrective => write!(f, "corrective"),
            SafeguardKind::Deterrent => write!(f, "deterrent"),
        }
    }
}

/// Lifecycle status of a safeguard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeguardStatus {
    Planned,
    InImplementation,
    Implemented,
    Operational,
    Obsolete,
}

impl SafeguardStatus {
    /// Whether a safeguard in this status counts toward mitigation and
    /// coverage. Only Implemented and Operational safeguards do.
    pub fn contributes_mitigation(&self) -> bool {
        matches!(
            self,
            SafeguardStatus::Implemented | SafeguardStatus::Operational
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafeguardStatus::Planned => "planned",
            SafeguardStatus::InImplementation => "in_implementation",
            SafeguardStatus::Implemented => "implemented",
            SafeguardStatus::Operational => "operational",
            SafeguardStatus::Obsolete => "obsolete",
        }
    }
}

impl std::fmt::Display for SafeguardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A MAGERIT security dimension a safeguard can protect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityDimension {
    Confidentiality,
    Integrity,
    Availability,
    Authenticity,
    Traceability,
}

/// A control applied against one or more threats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Safeguard {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique, stable business code (e.g., "SAL-021").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Kind of control.
    pub kind: SafeguardKind,
    /// Security dimensions this safeguard protects.
    pub dimensions: Vec<SecurityDimension>,
    /// Threats this safeguard controls.
    pub controlled_threats: Vec<Uuid>,
    /// Assets this safeguard protects.
    pub protected_assets: Vec<Uuid>,
    /// Stated effectiveness as a percentage, in [0, 100].
    pub effectiveness: f64,
    /// Lifecycle status.
    pub status: SafeguardStatus,
    /// One-off implementation cost.
    pub implementation_cost: f64,
    /// Recurring maintenance cost.
    pub maintenance_cost: f64,
    /// Timestamp when the safeguard was registered.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update.
    pub updated_at: DateTime<Utc>,
}

impl Safeguard {
    /// Creates a safeguard from a validated construction request.
    pub fn from_request(request: CreateSafeguardRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: request.code,
            name: request.name,
            kind: request.kind,
            dimensions: request.dimensions,
            controlled_threats: request.controlled_threats,
            protected_assets: request.protected_assets,
            effectiveness: request.effectiveness,
            status: request.status,
            implementation_cost: request.implementation_cost,
            maintenance_cost: request.maintenance_cost,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this safeguard counts toward mitigation and coverage.
    pub fn contributes_mitigation(&self) -> bool {
        self.status.contributes_mitigation()
    }

    /// Stated effectiveness as a fraction in [0, 1]. This is the single
    /// conversion point between the stored percent scale and the scorer's
    /// fractional domain.
    pub fn effectiveness_fraction(&self) -> f64 {
        self.effectiveness / 100.0
    }

    /// Whether this safeguard lists `threat_id` among its controlled
    /// threats.
    pub fn controls_threat(&self, threat_id: Uuid) -> bool {
        self.controlled_threats.contains(&threat_id)
    }

    /// Moves the safeguard to a new lifecycle status.
    pub fn set_status(&mut self, status: SafeguardStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Validated construction request for a [`Safeguard`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSafeguardRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub kind: SafeguardKind,
    #[serde(default)]
    pub dimensions: Vec<SecurityDimension>,
    #[serde(default)]
    pub controlled_threats: Vec<Uuid>,
    #[serde(default)]
    pub protected_assets: Vec<Uuid>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub effectiveness: f64,
    pub status: SafeguardStatus,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub implementation_cost: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub maintenance_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateSafeguardRequest {
        CreateSafeguardRequest {
            code: "SAL-021".to_string(),
            name: "Perimeter firewall".to_string(),
            kind: SafeguardKind::Preventive,
            dimensions: vec![
                SecurityDimension::Confidentiality,
                SecurityDimension::Availability,
            ],
            controlled_threats: vec![Uuid::new_v4()],
            protected_assets: vec![],
            effectiveness: 60.0,
            status: SafeguardStatus::Operational,
            implementation_cost: 15_000.0,
            maintenance_cost: 2_000.0,
        }
    }

    #[test]
    fn test_safeguard_from_request() {
        let safeguard = Safeguard::from_request(valid_request());
        assert_eq!(safeguard.code, "SAL-021");
        assert_eq!(safeguard.kind, SafeguardKind::Preventive);
        assert!(safeguard.contributes_mitigation());
    }

    #[test]
    fn test_mitigation_contribution_by_status() {
        assert!(SafeguardStatus::Implemented.contributes_mitigation());
        assert!(SafeguardStatus::Operational.contributes_mitigation());
        assert!(!SafeguardStatus::Planned.contributes_mitigation());
        assert!(!SafeguardStatus::InImplementation.contributes_mitigation());
        assert!(!SafeguardStatus::Obsolete.contributes_mitigation());
    }

    #[test]
    fn test_effectiveness_fraction() {
        let mut request = valid_request();
        request.effectiveness = 75.0;
        let safeguard = Safeguard::from_request(request);
        assert!((safeguard.effectiveness_fraction() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_controls_threat() {
        let request = valid_request();
        let threat_id = request.controlled_threats[0];
        let safeguard = Safeguard::from_request(request);
        assert!(safeguard.controls_threat(threat_id));
        assert!(!safeguard.controls_threat(Uuid::new_v4()));
    }

    #[test]
    fn test_effectiveness_range_enforced() {
        let mut request = valid_request();
        request.effectiveness = 101.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_set_status_touches_timestamp() {
        let mut safeguard = Safeguard::from_request(valid_request());
        let before = safeguard.updated_at;
        safeguard.set_status(SafeguardStatus::Obsolete);
        assert_eq!(safeguard.status, SafeguardStatus::Obsolete);
        assert!(safeguard.updated_at >= before);
    }
}

//! Vulnerability data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityStatus {
    Active,
    InTreatment,
    Mitigated,
    Accepted,
}

impl std::fmt::Display for VulnerabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VulnerabilityStatus::Active => write!(f, "active"),
            VulnerabilityStatus::InTreatment => write!(f, "in_treatment"),
            VulnerabilityStatus::Mitigated => write!(f, "mitigated"),
            VulnerabilityStatus::Accepted => write!(f, "accepted"),
        }
    }
}

/// A weakness that threats can exploit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique, stable business code (e.g., "VUL-007").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Ease of exploitation, in [0, 10].
    pub exploitability: f64,
    /// Assets affected by this vulnerability.
    pub affected_assets: Vec<Uuid>,
    /// Threats that can exploit this vulnerability.
    pub related_threats: Vec<Uuid>,
    /// Lifecycle status.
    pub status: VulnerabilityStatus,
    /// Timestamp when the vulnerability was detected.
    pub detected_at: DateTime<Utc>,
}

impl Vulnerability {
    /// Creates a vulnerability from a validated construction request.
    pub fn from_request(request: CreateVulnerabilityRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: request.code,
            name: request.name,
            exploitability: request.exploitability,
            affected_assets: request.affected_assets,
            related_threats: request.related_threats,
            status: request.status,
            detected_at: Utc::now(),
        }
    }

    /// Whether the vulnerability still represents open exposure.
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            VulnerabilityStatus::Active | VulnerabilityStatus::InTreatment
        )
    }
}

/// Validated construction request for a [`Vulnerability`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVulnerabilityRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0, max = 10.0))]
    pub exploitability: f64,
    #[serde(default)]
    pub affected_assets: Vec<Uuid>,
    #[serde(default)]
    pub related_threats: Vec<Uuid>,
    pub status: VulnerabilityStatus,
}

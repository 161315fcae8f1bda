//! Threat data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// MAGERIT threat category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    /// Natural disasters (flood, fire, earthquake).
    Natural,
    /// Human action, deliberate or accidental.
    Human,
    /// Technological failure or attack.
    Technological,
    /// Environmental conditions (power, cooling, pollution).
    Environmental,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Natural => "natural",
            ThreatCategory::Human => "human",
            ThreatCategory::Technological => "technological",
            ThreatCategory::Environmental => "environmental",
        }
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a threat originates relative to the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatOrigin {
    Internal,
    External,
    Mixed,
}

impl std::fmt::Display for ThreatOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatOrigin::Internal => write!(f, "internal"),
            ThreatOrigin::External => write!(f, "external"),
            ThreatOrigin::Mixed => write!(f, "mixed"),
        }
    }
}

/// A threat in the risk catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique, stable business code (e.g., "AME-014").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Threat category.
    pub category: ThreatCategory,
    /// Origin of the threat.
    pub origin: ThreatOrigin,
    /// Likelihood of materialization, in [0, 10].
    pub likelihood: f64,
    /// Timestamp when the threat was identified.
    pub created_at: DateTime<Utc>,
}

impl Threat {
    /// Creates a threat from a validated construction request.
    pub fn from_request(request: CreateThreatRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: request.code,
            name: request.name,
            description: request.description,
            category: request.category,
            origin: request.origin,
            likelihood: request.likelihood,
            created_at: Utc::now(),
        }
    }
}

/// Validated construction request for a [`Threat`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateThreatRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ThreatCategory,
    pub origin: ThreatOrigin,
    #[validate(range(min = 0.0, max = 10.0))]
    pub likelihood: f64,
}

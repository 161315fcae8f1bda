//! Asset data model.
//!
//! Assets are the information resources being protected: services,
//! applications, data stores, infrastructure. Each asset carries a
//! five-dimension MAGERIT security valuation and an economic value; its
//! criticality is derived from both and is never stored authoritatively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The five MAGERIT security-dimension scores, each in [0, 10].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SecurityValuation {
    #[validate(range(min = 0.0, max = 10.0))]
    pub confidentiality: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub integrity: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub availability: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub authenticity: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub traceability: f64,
}

impl SecurityValuation {
    /// Creates a valuation with the same score on every dimension.
    pub fn uniform(score: f64) -> Self {
        Self {
            confidentiality: score,
            integrity: score,
            availability: score,
            authenticity: score,
            traceability: score,
        }
    }

    /// Arithmetic mean of the five dimension scores.
    pub fn average(&self) -> f64 {
        (self.confidentiality + self.integrity + self.availability + self.authenticity
            + self.traceability)
            / 5.0
    }

    /// The dimension scores in declaration order.
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.confidentiality,
            self.integrity,
            self.availability,
            self.authenticity,
            self.traceability,
        ]
    }
}

/// An information asset in the risk catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique, stable business code (e.g., "ACT-001").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Type of asset (service, application, data, hardware, ...).
    pub asset_type: String,
    /// Classification category.
    pub category: String,
    /// Business owner of the asset.
    pub owner: String,
    /// Technical custodian.
    pub custodian: String,
    /// Physical or logical location.
    pub location: String,
    /// Security-dimension valuation.
    pub valuation: SecurityValuation,
    /// Economic value in monetary units, non-negative.
    pub economic_value: f64,
    /// Ordered dependency references to other assets. Weak references: an
    /// asset never owns its dependencies, and deleting a dependency must
    /// not cascade to dependents.
    pub dependencies: Vec<Uuid>,
    /// Timestamp when the asset was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update.
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Creates an asset from a validated construction request.
    pub fn from_request(request: CreateAssetRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: request.code,
            name: request.name,
            asset_type: request.asset_type,
            category: request.category,
            owner: request.owner,
            custodian: request.custodian,
            location: request.location,
            valuation: request.valuation,
            economic_value: request.economic_value,
            dependencies: request.dependencies,
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether this asset lists `other` as a direct dependency.
    pub fn depends_on(&self, other: Uuid) -> bool {
        self.dependencies.contains(&other)
    }
}

/// Validated construction request for an [`Asset`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub custodian: String,
    #[serde(default)]
    pub location: String,
    #[validate(nested)]
    pub valuation: SecurityValuation,
    #[validate(range(min = 0.0))]
    pub economic_value: f64,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
}

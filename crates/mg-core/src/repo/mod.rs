//! Repository collaborator interfaces.
//!
//! The engine has no wire protocol or persistence of its own; data sourcing
//! is delegated to these traits. In-memory implementations suitable for
//! tests and embedding live in [`memory`].

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::asset::Asset;
use crate::models::risk::{RiskLevel, RiskRecord};
use crate::models::safeguard::Safeguard;
use crate::models::snapshot::DailySnapshot;
use crate::models::threat::Threat;
use crate::models::vulnerability::Vulnerability;

pub use memory::{
    InMemoryAssetRepository, InMemoryRiskRecordRepository, InMemorySafeguardRepository,
    InMemorySnapshotStore, InMemoryThreatRepository, InMemoryVulnerabilityRepository,
};

/// Errors that can occur in a repository collaborator.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Record not found.
    #[error("record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Constraint violation (e.g., duplicate code).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Underlying storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Read/write access to the asset catalog.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn create(&self, asset: &Asset) -> Result<Asset, RepoError>;
    async fn get(&self, id: Uuid) -> Result<Option<Asset>, RepoError>;
    async fn get_by_code(&self, code: &str) -> Result<Option<Asset>, RepoError>;
    async fn list_all(&self) -> Result<Vec<Asset>, RepoError>;
    async fn update(&self, asset: &Asset) -> Result<Asset, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Read/write access to the threat catalog.
#[async_trait]
pub trait ThreatRepository: Send + Sync {
    async fn create(&self, threat: &Threat) -> Result<Threat, RepoError>;
    async fn get(&self, id: Uuid) -> Result<Option<Threat>, RepoError>;
    async fn list_all(&self) -> Result<Vec<Threat>, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Read/write access to the vulnerability catalog.
#[async_trait]
pub trait VulnerabilityRepository: Send + Sync {
    async fn create(&self, vulnerability: &Vulnerability) -> Result<Vulnerability, RepoError>;
    async fn get(&self, id: Uuid) -> Result<Option<Vulnerability>, RepoError>;
    async fn list_all(&self) -> Result<Vec<Vulnerability>, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Read/write access to the safeguard catalog.
#[async_trait]
pub trait SafeguardRepository: Send + Sync {
    async fn create(&self, safeguard: &Safeguard) -> Result<Safeguard, RepoError>;
    async fn get(&self, id: Uuid) -> Result<Option<Safeguard>, RepoError>;
    async fn list_all(&self) -> Result<Vec<Safeguard>, RepoError>;
    async fn update(&self, safeguard: &Safeguard) -> Result<Safeguard, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Read/write access to risk records.
///
/// `update_derived` is the only write path for engine-owned derived fields;
/// it must be supported for the bulk recalculation pass, which also relies
/// on `list_all`.
#[async_trait]
pub trait RiskRecordRepository: Send + Sync {
    async fn create(&self, record: &RiskRecord) -> Result<RiskRecord, RepoError>;
    async fn get(&self, id: Uuid) -> Result<Option<RiskRecord>, RepoError>;
    async fn list_all(&self) -> Result<Vec<RiskRecord>, RepoError>;
    async fn update_derived(
        &self,
        id: Uuid,
        inherent_risk: f64,
        residual_risk: f64,
        level: RiskLevel,
    ) -> Result<RiskRecord, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Append/query store for daily aggregate snapshots.
///
/// Absent entries are not errors: a day without a snapshot is reported as a
/// zero-count bucket by the trend series builder.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn append(&self, snapshot: &DailySnapshot) -> Result<(), RepoError>;
    async fn query(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailySnapshot>, RepoError>;
}

//! # mg-core
//!
//! Core data models and collaborator interfaces for Magerisk, a MAGERIT v3.0
//! risk-management engine.
//!
//! This crate provides the typed domain model (assets, threats,
//! vulnerabilities, safeguards, risk records), the engine configuration
//! surface, the asset dependency graph, and the repository traits the
//! computation engine in `mg-engine` is built against.

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod repo;

pub use config::{CriticalityWeights, EngineConfig, RiskThresholds, TrendWindows};
pub use error::EngineError;
pub use graph::DependencyGraph;
pub use models::asset::{Asset, CreateAssetRequest, SecurityValuation};
pub use models::risk::{
    CreateRiskRequest, RiskLevel, RiskRecord, RiskStatus, TreatmentStrategy,
};
pub use models::safeguard::{
    CreateSafeguardRequest, Safeguard, SafeguardKind, SafeguardStatus, SecurityDimension,
};
pub use models::snapshot::DailySnapshot;
pub use models::threat::{CreateThreatRequest, Threat, ThreatCategory, ThreatOrigin};
pub use models::vulnerability::{
    CreateVulnerabilityRequest, Vulnerability, VulnerabilityStatus,
};
pub use repo::{
    AssetRepository, RepoError, RiskRecordRepository, SafeguardRepository, SnapshotStore,
    ThreatRepository, VulnerabilityRepository,
};

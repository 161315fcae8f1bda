//! In-memory repository implementations.
//!
//! Backed by `Arc<RwLock<HashMap>>`; used by the test suites and suitable
//! for embedding the engine without an external store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::asset::Asset;
use crate::models::risk::{RiskLevel, RiskRecord};
use crate::models::safeguard::Safeguard;
use crate::models::snapshot::DailySnapshot;
use crate::models::threat::Threat;
use crate::models::vulnerability::Vulnerability;
use crate::repo::{
    AssetRepository, RepoError, RiskRecordRepository, SafeguardRepository, SnapshotStore,
    ThreatRepository, VulnerabilityRepository,
};

fn duplicate_id(entity: &str, id: Uuid) -> RepoError {
    RepoError::Constraint(format!("{entity} with id '{id}' already exists"))
}

fn duplicate_code(entity: &str, code: &str) -> RepoError {
    RepoError::Constraint(format!("{entity} with code '{code}' already exists"))
}

fn not_found(entity: &str, id: Uuid) -> RepoError {
    RepoError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

/// In-memory implementation of [`AssetRepository`].
#[derive(Default)]
pub struct InMemoryAssetRepository {
    assets: Arc<RwLock<HashMap<Uuid, Asset>>>,
}

impl InMemoryAssetRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with assets.
    pub fn with_assets(assets: Vec<Asset>) -> Self {
        let map: HashMap<Uuid, Asset> = assets.into_iter().map(|a| (a.id, a)).collect();
        Self {
            assets: Arc::new(RwLock::new(map)),
        }
    }

    /// Gets a snapshot of all stored assets.
    pub async fn snapshot(&self) -> Vec<Asset> {
        self.assets.read().await.values().cloned().collect()
    }

    /// Clears all stored assets.
    pub async fn clear(&self) {
        self.assets.write().await.clear();
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn create(&self, asset: &Asset) -> Result<Asset, RepoError> {
        let mut assets = self.assets.write().await;
        if assets.contains_key(&asset.id) {
            return Err(duplicate_id("Asset", asset.id));
        }
        if assets.values().any(|a| a.code == asset.code) {
            return Err(duplicate_code("Asset", &asset.code));
        }
        assets.insert(asset.id, asset.clone());
        Ok(asset.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asset>, RepoError> {
        Ok(self.assets.read().await.get(&id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Asset>, RepoError> {
        Ok(self
            .assets
            .read()
            .await
            .values()
            .find(|a| a.code == code)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Asset>, RepoError> {
        Ok(self.assets.read().await.values().cloned().collect())
    }

    async fn update(&self, asset: &Asset) -> Result<Asset, RepoError> {
        let mut assets = self.assets.write().await;
        if !assets.contains_key(&asset.id) {
            return Err(not_found("Asset", asset.id));
        }
        assets.insert(asset.id, asset.clone());
        Ok(asset.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut assets = self.assets.write().await;
        assets.remove(&id).ok_or_else(|| not_found("Asset", id))?;
        Ok(())
    }
}

/// In-memory implementation of [`ThreatRepository`].
#[derive(Default)]
pub struct InMemoryThreatRepository {
    threats: Arc<RwLock<HashMap<Uuid, Threat>>>,
}

impl InMemoryThreatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threats(threats: Vec<Threat>) -> Self {
        let map: HashMap<Uuid, Threat> = threats.into_iter().map(|t| (t.id, t)).collect();
        Self {
            threats: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl ThreatRepository for InMemoryThreatRepository {
    async fn create(&self, threat: &Threat) -> Result<Threat, RepoError> {
        let mut threats = self.threats.write().await;
        if threats.contains_key(&threat.id) {
            return Err(duplicate_id("Threat", threat.id));
        }
        if threats.values().any(|t| t.code == threat.code) {
            return Err(duplicate_code("Threat", &threat.code));
        }
        threats.insert(threat.id, threat.clone());
        Ok(threat.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Threat>, RepoError> {
        Ok(self.threats.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Threat>, RepoError> {
        Ok(self.threats.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut threats = self.threats.write().await;
        threats.remove(&id).ok_or_else(|| not_found("Threat", id))?;
        Ok(())
    }
}

/// In-memory implementation of [`VulnerabilityRepository`].
#[derive(Default)]
pub struct InMemoryVulnerabilityRepository {
    vulnerabilities: Arc<RwLock<HashMap<Uuid, Vulnerability>>>,
}

impl InMemoryVulnerabilityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vulnerabilities(vulnerabilities: Vec<Vulnerability>) -> Self {
        let map: HashMap<Uuid, Vulnerability> =
            vulnerabilities.into_iter().map(|v| (v.id, v)).collect();
        Self {
            vulnerabilities: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl VulnerabilityRepository for InMemoryVulnerabilityRepository {
    async fn create(&self, vulnerability: &Vulnerability) -> Result<Vulnerability, RepoError> {
        let mut vulnerabilities = self.vulnerabilities.write().await;
        if vulnerabilities.contains_key(&vulnerability.id) {
            return Err(duplicate_id("Vulnerability", vulnerability.id));
        }
        vulnerabilities.insert(vulnerability.id, vulnerability.clone());
        Ok(vulnerability.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vulnerability>, RepoError> {
        Ok(self.vulnerabilities.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Vulnerability>, RepoError> {
        Ok(self
            .vulnerabilities
            .read()
            .await
            .values()
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut vulnerabilities = self.vulnerabilities.write().await;
        vulnerabilities
            .remove(&id)
            .ok_or_else(|| not_found("Vulnerability", id))?;
        Ok(())
    }
}

/// In-memory implementation of [`SafeguardRepository`].
#[derive(Default)]
pub struct InMemorySafeguardRepository {
    safeguards: Arc<RwLock<HashMap<Uuid, Safeguard>>>,
}

impl InMemorySafeguardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_safeguards(safeguards: Vec<Safeguard>) -> Self {
        let map: HashMap<Uuid, Safeguard> = safeguards.into_iter().map(|s| (s.id, s)).collect();
        Self {
            safeguards: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl SafeguardRepository for InMemorySafeguardRepository {
    async fn create(&self, safeguard: &Safeguard) -> Result<Safeguard, RepoError> {
        let mut safeguards = self.safeguards.write().await;
        if safeguards.contains_key(&safeguard.id) {
            return Err(duplicate_id("Safeguard", safeguard.id));
        }
        if safeguards.values().any(|s| s.code == safeguard.code) {
            return Err(duplicate_code("Safeguard", &safeguard.code));
        }
        safeguards.insert(safeguard.id, safeguard.clone());
        Ok(safeguard.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Safeguard>, RepoError> {
        Ok(self.safeguards.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Safeguard>, RepoError> {
        Ok(self.safeguards.read().await.values().cloned().collect())
    }

    async fn update(&self, safeguard: &Safeguard) -> Result<Safeguard, RepoError> {
        let mut safeguards = self.safeguards.write().await;
        if !safeguards.contains_key(&safeguard.id) {
            return Err(not_found("Safeguard", safeguard.id));
        }
        safeguards.insert(safeguard.id, safeguard.clone());
        Ok(safeguard.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut safeguards = self.safeguards.write().await;
        safeguards
            .remove(&id)
            .ok_or_else(|| not_found("Safeguard", id))?;
        Ok(())
    }
}

/// In-memory implementation of [`RiskRecordRepository`].
#[derive(Default)]
pub struct InMemoryRiskRecordRepository {
    records: Arc<RwLock<HashMap<Uuid, RiskRecord>>>,
}

impl InMemoryRiskRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RiskRecord>) -> Self {
        let map: HashMap<Uuid, RiskRecord> = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    /// Gets a snapshot of all stored records.
    pub async fn snapshot(&self) -> Vec<RiskRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl RiskRecordRepository for InMemoryRiskRecordRepository {
    async fn create(&self, record: &RiskRecord) -> Result<RiskRecord, RepoError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(duplicate_id("RiskRecord", record.id));
        }
        if records.values().any(|r| r.code == record.code) {
            return Err(duplicate_code("RiskRecord", &record.code));
        }
        records.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<RiskRecord>, RepoError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<RiskRecord>, RepoError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn update_derived(
        &self,
        id: Uuid,
        inherent_risk: f64,
        residual_risk: f64,
        level: RiskLevel,
    ) -> Result<RiskRecord, RepoError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| not_found("RiskRecord", id))?;
        record.apply_derived(inherent_risk, residual_risk, level);
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut records = self.records.write().await;
        records
            .remove(&id)
            .ok_or_else(|| not_found("RiskRecord", id))?;
        Ok(())
    }
}

/// In-memory implementation of [`SnapshotStore`], keyed by day.
///
/// Appending a snapshot for an existing day replaces it; the store keeps
/// one snapshot per calendar day.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: Arc<RwLock<BTreeMap<NaiveDate, DailySnapshot>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: Vec<DailySnapshot>) -> Self {
        let map: BTreeMap<NaiveDate, DailySnapshot> =
            snapshots.into_iter().map(|s| (s.date, s)).collect();
        Self {
            snapshots: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn append(&self, snapshot: &DailySnapshot) -> Result<(), RepoError> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.date, *snapshot);
        Ok(())
    }

    async fn query(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailySnapshot>, RepoError> {
        Ok(self
            .snapshots
            .read()
            .await
            .range(from..=to)
            .map(|(_, s)| *s)
            .collect())
    }
}

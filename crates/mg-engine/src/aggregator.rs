//! Portfolio aggregation: dashboard KPIs, risk matrix, and trend series.
//!
//! The KPI snapshot is assembled from four independently-fetchable stat
//! sources with a settle-all fan-out: a failure in one source degrades its
//! field to zeros with a degradation flag, and never aborts the snapshot.
//! Trend series are fixed-length daily buckets with zero-filled gaps, a
//! contract chart rendering relies on.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use mg_core::config::{CriticalityWeights, TrendWindows};
use mg_core::error::EngineError;
use mg_core::models::risk::{RiskLevel, RiskRecord};
use mg_core::models::snapshot::DailySnapshot;
use mg_core::repo::{
    AssetRepository, RiskRecordRepository, SafeguardRepository, SnapshotStore,
    VulnerabilityRepository,
};

use crate::stats::{AssetStats, RiskStats, SafeguardStats, VulnerabilityStats};

/// The four independently-fetchable sub-aggregates behind the dashboard.
///
/// Each method is attempted in isolation; implementations should not let
/// one source's failure poison another.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn asset_stats(&self) -> Result<AssetStats, EngineError>;
    async fn risk_stats(&self) -> Result<RiskStats, EngineError>;
    async fn vulnerability_stats(&self) -> Result<VulnerabilityStats, EngineError>;
    async fn safeguard_stats(&self) -> Result<SafeguardStats, EngineError>;
}

/// One KPI field with its degradation indicator.
///
/// `degraded = true` means the backing source was unavailable and `value`
/// is the documented zero default, distinguishing "genuinely zero" from
/// "source unavailable".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiField<T> {
    pub value: T,
    pub degraded: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> KpiField<T> {
    /// A field populated from a healthy source.
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            degraded: false,
            error: None,
        }
    }
}

impl<T: Default> KpiField<T> {
    /// A zero-default field for an unavailable source.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            value: T::default(),
            degraded: true,
            error: Some(error.into()),
        }
    }

    fn settle(name: &str, result: Result<T, EngineError>) -> Self {
        match result {
            Ok(value) => Self::fresh(value),
            Err(err) => {
                let failure = EngineError::PartialSourceFailure {
                    name: name.to_string(),
                    reason: err.to_string(),
                };
                warn!(source = name, error = %err, "stats source degraded");
                Self::degraded(failure.to_string())
            }
        }
    }
}

/// Overall health of a KPI snapshot, derived from how many sources settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotHealth {
    /// Every source contributed.
    Healthy,
    /// At least half of the sources contributed.
    Degraded,
    /// Fewer than half of the sources contributed.
    Down,
}

/// Direction of the risk count trend between the two latest snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Dashboard KPI snapshot with per-field degradation indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub assets: KpiField<AssetStats>,
    pub risks: KpiField<RiskStats>,
    pub vulnerabilities: KpiField<VulnerabilityStats>,
    pub safeguards: KpiField<SafeguardStats>,
    pub generated_at: DateTime<Utc>,
}

impl KpiSnapshot {
    pub fn total_assets(&self) -> u64 {
        self.assets.value.total_assets
    }

    pub fn critical_risks(&self) -> u64 {
        self.risks.value.critical_risks
    }

    pub fn active_vulnerabilities(&self) -> u64 {
        self.vulnerabilities.value.active_vulnerabilities
    }

    pub fn implemented_safeguards(&self) -> u64 {
        self.safeguards.value.implemented_safeguards
    }

    /// Mean effectiveness of the contributing safeguards, as a percent.
    pub fn program_effectiveness(&self) -> f64 {
        self.safeguards.value.average_effectiveness
    }

    /// Names of the sources that failed to contribute.
    pub fn degraded_sources(&self) -> Vec<&'static str> {
        let mut sources = Vec::new();
        if self.assets.degraded {
            sources.push("assets");
        }
        if self.risks.degraded {
            sources.push("risks");
        }
        if self.vulnerabilities.degraded {
            sources.push("vulnerabilities");
        }
        if self.safeguards.degraded {
            sources.push("safeguards");
        }
        sources
    }

    /// Health classification from the number of contributing sources.
    pub fn health(&self) -> SnapshotHealth {
        let degraded = self.degraded_sources().len();
        if degraded == 0 {
            SnapshotHealth::Healthy
        } else if degraded <= 2 {
            SnapshotHealth::Degraded
        } else {
            SnapshotHealth::Down
        }
    }
}

/// Builds a KPI snapshot with a settle-all fan-out over the four sources.
///
/// Never fails as a whole: each source failure is isolated into its field's
/// degradation indicator.
#[instrument(skip(provider))]
pub async fn build_kpi_snapshot(provider: &dyn StatsProvider) -> KpiSnapshot {
    let (assets, risks, vulnerabilities, safeguards) = tokio::join!(
        provider.asset_stats(),
        provider.risk_stats(),
        provider.vulnerability_stats(),
        provider.safeguard_stats(),
    );

    KpiSnapshot {
        assets: KpiField::settle("assets", assets),
        risks: KpiField::settle("risks", risks),
        vulnerabilities: KpiField::settle("vulnerabilities", vulnerabilities),
        safeguards: KpiField::settle("safeguards", safeguards),
        generated_at: Utc::now(),
    }
}

/// A [`StatsProvider`] backed by the repository collaborators.
pub struct RepositoryStatsProvider {
    assets: Arc<dyn AssetRepository>,
    risks: Arc<dyn RiskRecordRepository>,
    vulnerabilities: Arc<dyn VulnerabilityRepository>,
    safeguards: Arc<dyn SafeguardRepository>,
    weights: CriticalityWeights,
}

impl RepositoryStatsProvider {
    pub fn new(
        assets: Arc<dyn AssetRepository>,
        risks: Arc<dyn RiskRecordRepository>,
        vulnerabilities: Arc<dyn VulnerabilityRepository>,
        safeguards: Arc<dyn SafeguardRepository>,
        weights: CriticalityWeights,
    ) -> Self {
        Self {
            assets,
            risks,
            vulnerabilities,
            safeguards,
            weights,
        }
    }
}

#[async_trait]
impl StatsProvider for RepositoryStatsProvider {
    async fn asset_stats(&self) -> Result<AssetStats, EngineError> {
        let assets = self.assets.list_all().await?;
        Ok(AssetStats::from_assets(&assets, &self.weights))
    }

    async fn risk_stats(&self) -> Result<RiskStats, EngineError> {
        let records = self.risks.list_all().await?;
        Ok(RiskStats::from_records(&records))
    }

    async fn vulnerability_stats(&self) -> Result<VulnerabilityStats, EngineError> {
        let vulnerabilities = self.vulnerabilities.list_all().await?;
        Ok(VulnerabilityStats::from_vulnerabilities(&vulnerabilities))
    }

    async fn safeguard_stats(&self) -> Result<SafeguardStats, EngineError> {
        let safeguards = self.safeguards.list_all().await?;
        Ok(SafeguardStats::from_safeguards(&safeguards))
    }
}

/// One cell of the likelihood × impact risk matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMatrixCell {
    /// Display label: the asset name when resolvable, else the record code.
    pub label: String,
    pub likelihood: f64,
    pub impact: f64,
    /// The record's stored classification, which the engine derives with
    /// the standard thresholds; the matrix never re-derives it differently.
    pub level: RiskLevel,
}

/// Projects the current risk records onto a flat matrix dataset, ordered
/// by record code for reproducible output.
pub fn build_risk_matrix(
    records: &[RiskRecord],
    asset_names: &HashMap<Uuid, String>,
) -> Vec<RiskMatrixCell> {
    let mut cells: Vec<RiskMatrixCell> = records
        .iter()
        .map(|record| RiskMatrixCell {
            label: asset_names
                .get(&record.asset_id)
                .cloned()
                .unwrap_or_else(|| record.code.clone()),
            likelihood: record.likelihood,
            impact: record.impact,
            level: record.risk_level,
        })
        .collect();
    cells.sort_by(|a, b| a.label.cmp(&b.label));
    cells
}

/// A named trend window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendRange {
    Week,
    Month,
    Quarter,
}

impl TrendRange {
    /// Parse from the wire format used by dashboards ("7d"/"30d"/"90d").
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7d" => Some(TrendRange::Week),
            "30d" => Some(TrendRange::Month),
            "90d" => Some(TrendRange::Quarter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendRange::Week => "7d",
            TrendRange::Month => "30d",
            TrendRange::Quarter => "90d",
        }
    }

    /// Window length in days under the given configuration.
    pub fn days(&self, windows: &TrendWindows) -> u32 {
        match self {
            TrendRange::Week => windows.short_days,
            TrendRange::Month => windows.medium_days,
            TrendRange::Quarter => windows.long_days,
        }
    }
}

impl std::fmt::Display for TrendRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One daily bucket of a trend series.
pub type TrendPoint = DailySnapshot;

/// Buckets historical snapshots by day over `[end - days, end]`.
///
/// The series always has `days + 1` points: a day without a snapshot
/// reports zero counts rather than being omitted.
pub fn build_trend_series(
    snapshots: &[DailySnapshot],
    days: u32,
    end: NaiveDate,
) -> Vec<TrendPoint> {
    let by_date: HashMap<NaiveDate, &DailySnapshot> =
        snapshots.iter().map(|s| (s.date, s)).collect();

    (0..=days)
        .rev()
        .map(|offset| {
            let date = end - Duration::days(offset as i64);
            by_date
                .get(&date)
                .map(|s| **s)
                .unwrap_or_else(|| DailySnapshot::empty(date))
        })
        .collect()
}

/// Queries a snapshot store and builds the trend series for a named range.
pub async fn build_trend_series_from_store(
    store: &dyn SnapshotStore,
    range: TrendRange,
    windows: &TrendWindows,
    end: NaiveDate,
) -> Result<Vec<TrendPoint>, EngineError> {
    let days = range.days(windows);
    let from = end - Duration::days(days as i64);
    let snapshots = store.query(from, end).await?;
    Ok(build_trend_series(&snapshots, days, end))
}

/// Direction of the risk count between the two most recent snapshots.
/// Fewer than two snapshots is reported as stable.
pub fn risk_trend(snapshots: &[DailySnapshot]) -> TrendDirection {
    let mut ordered: Vec<&DailySnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.date);
    match ordered.as_slice() {
        [.., previous, latest] => {
            if latest.risks > previous.risks {
                TrendDirection::Up
            } else if latest.risks < previous.risks {
                TrendDirection::Down
            } else {
                TrendDirection::Stable
            }
        }
        _ => TrendDirection::Stable,
    }
}

/// The `limit` highest risks by residual score, ties broken by code.
pub fn top_risks(records: &[RiskRecord], limit: usize) -> Vec<RiskRecord> {
    let mut sorted: Vec<RiskRecord> = records.to_vec();
    sorted.sort_by(|a, b| {
        b.residual_risk
            .total_cmp(&a.residual_risk)
            .then_with(|| a.code.cmp(&b.code))
    });
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_core::models::risk::{CreateRiskRequest, TreatmentStrategy};
    use mg_core::repo::InMemorySnapshotStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn record(code: &str, residual: f64, level: RiskLevel) -> RiskRecord {
        let mut record = RiskRecord::from_request(CreateRiskRequest {
            code: code.to_string(),
            name: code.to_string(),
            asset_id: Uuid::new_v4(),
            threat_id: Uuid::new_v4(),
            vulnerability_id: None,
            likelihood: 5.0,
            impact: 6.0,
            safeguard_ids: vec![],
            treatment: TreatmentStrategy::Mitigate,
        });
        record.apply_derived(3.0, residual, level);
        record
    }

    /// Provider where individual sources can be switched to failing.
    struct PartialProvider {
        fail_assets: bool,
        fail_safeguards: bool,
    }

    #[async_trait]
    impl StatsProvider for PartialProvider {
        async fn asset_stats(&self) -> Result<AssetStats, EngineError> {
            if self.fail_assets {
                return Err(EngineError::Validation("asset source offline".to_string()));
            }
            Ok(AssetStats {
                total_assets: 12,
                ..AssetStats::default()
            })
        }

        async fn risk_stats(&self) -> Result<RiskStats, EngineError> {
            Ok(RiskStats {
                total_risks: 7,
                critical_risks: 2,
                ..RiskStats::default()
            })
        }

        async fn vulnerability_stats(&self) -> Result<VulnerabilityStats, EngineError> {
            Ok(VulnerabilityStats {
                total_vulnerabilities: 4,
                active_vulnerabilities: 3,
                ..VulnerabilityStats::default()
            })
        }

        async fn safeguard_stats(&self) -> Result<SafeguardStats, EngineError> {
            if self.fail_safeguards {
                return Err(EngineError::Validation(
                    "safeguard source offline".to_string(),
                ));
            }
            Ok(SafeguardStats {
                total_safeguards: 9,
                implemented_safeguards: 5,
                average_effectiveness: 62.0,
                ..SafeguardStats::default()
            })
        }
    }

    #[tokio::test]
    async fn test_snapshot_all_sources_healthy() {
        let provider = PartialProvider {
            fail_assets: false,
            fail_safeguards: false,
        };
        let snapshot = build_kpi_snapshot(&provider).await;

        assert_eq!(snapshot.total_assets(), 12);
        assert_eq!(snapshot.critical_risks(), 2);
        assert_eq!(snapshot.active_vulnerabilities(), 3);
        assert_eq!(snapshot.implemented_safeguards(), 5);
        assert_eq!(snapshot.program_effectiveness(), 62.0);
        assert!(snapshot.degraded_sources().is_empty());
        assert_eq!(snapshot.health(), SnapshotHealth::Healthy);
    }

    #[tokio::test]
    async fn test_snapshot_survives_safeguard_source_failure() {
        let provider = PartialProvider {
            fail_assets: false,
            fail_safeguards: true,
        };
        let snapshot = build_kpi_snapshot(&provider).await;

        // Other fields still contribute.
        assert_eq!(snapshot.total_assets(), 12);
        assert_eq!(snapshot.critical_risks(), 2);
        // The failed field degrades to zero with its flag set.
        assert!(snapshot.safeguards.degraded);
        assert_eq!(snapshot.implemented_safeguards(), 0);
        assert!(snapshot
            .safeguards
            .error
            .as_deref()
            .unwrap()
            .contains("safeguard source offline"));
        assert_eq!(snapshot.degraded_sources(), vec!["safeguards"]);
        assert_eq!(snapshot.health(), SnapshotHealth::Degraded);
    }

    #[tokio::test]
    async fn test_snapshot_health_down() {
        struct AllFailing;

        #[async_trait]
        impl StatsProvider for AllFailing {
            async fn asset_stats(&self) -> Result<AssetStats, EngineError> {
                Err(EngineError::Validation("offline".to_string()))
            }
            async fn risk_stats(&self) -> Result<RiskStats, EngineError> {
                Err(EngineError::Validation("offline".to_string()))
            }
            async fn vulnerability_stats(&self) -> Result<VulnerabilityStats, EngineError> {
                Err(EngineError::Validation("offline".to_string()))
            }
            async fn safeguard_stats(&self) -> Result<SafeguardStats, EngineError> {
                Err(EngineError::Validation("offline".to_string()))
            }
        }

        let snapshot = build_kpi_snapshot(&AllFailing).await;
        assert_eq!(snapshot.degraded_sources().len(), 4);
        assert_eq!(snapshot.health(), SnapshotHealth::Down);
        assert_eq!(snapshot.total_assets(), 0);
    }

    #[test]
    fn test_risk_matrix_labels_and_levels() {
        let first = record("RSG-001", 9.0, RiskLevel::Critical);
        let second = record("RSG-002", 1.0, RiskLevel::VeryLow);
        let mut names = HashMap::new();
        names.insert(first.asset_id, "Mail service".to_string());

        let matrix = build_risk_matrix(&[first.clone(), second], &names);

        assert_eq!(matrix.len(), 2);
        let mail = matrix.iter().find(|c| c.label == "Mail service").unwrap();
        assert_eq!(mail.level, RiskLevel::Critical);
        assert_eq!(mail.likelihood, first.likelihood);
        // Unresolvable asset falls back to the record code.
        assert!(matrix.iter().any(|c| c.label == "RSG-002"));
    }

    #[test]
    fn test_trend_series_fixed_length_and_zero_fill() {
        let snapshots = vec![
            DailySnapshot::new(day(8), 5, 2, 1),
            DailySnapshot::new(day(10), 7, 3, 2),
        ];
        let series = build_trend_series(&snapshots, 7, day(10));

        assert_eq!(series.len(), 8);
        assert_eq!(series[0].date, day(3));
        assert_eq!(series[7].date, day(10));
        // Recorded days carry their counts; gaps report zero.
        assert_eq!(series[5].risks, 5);
        assert_eq!(series[7].risks, 7);
        assert_eq!(series[6].risks, 0);
        assert_eq!(series[0].risks, 0);
    }

    #[tokio::test]
    async fn test_trend_series_from_store() {
        let store = InMemorySnapshotStore::with_snapshots(vec![DailySnapshot::new(
            day(9),
            4,
            1,
            2,
        )]);
        let series = build_trend_series_from_store(
            &store,
            TrendRange::Week,
            &TrendWindows::default(),
            day(10),
        )
        .await
        .unwrap();

        assert_eq!(series.len(), 8);
        assert_eq!(series[6].risks, 4);
        assert_eq!(series[7].risks, 0);
    }

    #[test]
    fn test_trend_range_parse() {
        assert_eq!(TrendRange::parse("7d"), Some(TrendRange::Week));
        assert_eq!(TrendRange::parse("30d"), Some(TrendRange::Month));
        assert_eq!(TrendRange::parse("90d"), Some(TrendRange::Quarter));
        assert_eq!(TrendRange::parse("1y"), None);
        assert_eq!(TrendRange::Quarter.days(&TrendWindows::default()), 90);
    }

    #[test]
    fn test_risk_trend_direction() {
        let rising = vec![
            DailySnapshot::new(day(1), 3, 0, 0),
            DailySnapshot::new(day(2), 5, 0, 0),
        ];
        assert_eq!(risk_trend(&rising), TrendDirection::Up);

        let falling = vec![
            DailySnapshot::new(day(1), 5, 0, 0),
            DailySnapshot::new(day(2), 3, 0, 0),
        ];
        assert_eq!(risk_trend(&falling), TrendDirection::Down);

        let flat = vec![
            DailySnapshot::new(day(1), 5, 0, 0),
            DailySnapshot::new(day(2), 5, 0, 0),
        ];
        assert_eq!(risk_trend(&flat), TrendDirection::Stable);

        assert_eq!(risk_trend(&[]), TrendDirection::Stable);
    }

    #[tokio::test]
    async fn test_snapshot_serialization() {
        let provider = PartialProvider {
            fail_assets: true,
            fail_safeguards: false,
        };
        let snapshot = build_kpi_snapshot(&provider).await;

        let json = serde_json::to_string(&snapshot).unwrap();
        let deserialized: KpiSnapshot = serde_json::from_str(&json).unwrap();
        assert!(deserialized.assets.degraded);
        assert_eq!(deserialized.implemented_safeguards(), 5);
        assert_eq!(deserialized.health(), SnapshotHealth::Degraded);
    }

    #[test]
    fn test_top_risks() {
        let records = vec![
            record("RSG-001", 2.0, RiskLevel::Low),
            record("RSG-002", 9.5, RiskLevel::Critical),
            record("RSG-003", 6.0, RiskLevel::High),
        ];
        let top = top_risks(&records, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].code, "RSG-002");
        assert_eq!(top[1].code, "RSG-003");
    }
}

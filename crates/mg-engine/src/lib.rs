//! # mg-engine
//!
//! The Magerisk risk quantification engine.
//!
//! Deterministic computation over the `mg-core` domain model: asset
//! criticality, inherent and residual risk, coverage analysis, portfolio
//! KPIs, bulk recalculation with single-flight mutual exclusion, and bulk
//! import validation. Every component except the recalculation coordinator
//! is a pure, stateless computation safe to call from concurrent contexts.

pub mod aggregator;
pub mod calculator;
pub mod coverage;
pub mod criticality;
pub mod import;
pub mod recalc;
pub mod scoring;
pub mod stats;

pub use aggregator::{
    build_kpi_snapshot, build_risk_matrix, build_trend_series, build_trend_series_from_store,
    risk_trend, top_risks, KpiField, KpiSnapshot, RepositoryStatsProvider, RiskMatrixCell,
    SnapshotHealth, StatsProvider, TrendDirection, TrendPoint, TrendRange,
};
pub use calculator::{DerivedRisk, RiskCalculationRequest, RiskCalculationOutcome, RiskCalculator};
pub use coverage::{evaluate_coverage, CoverageReport, UncoveredThreat};
pub use criticality::{compute_criticality, CriticalityLabel, CriticalityScore};
pub use import::{validate_import_batch, ImportOutcome, ImportValidation, RawAssetRow, RowError};
pub use recalc::{RecalcCoordinator, RecalcReport, RecordFailure};
pub use scoring::{
    classify_risk_level, classify_risk_level_with, combine_safeguard_effectiveness,
    compute_inherent_risk, compute_residual_risk, simulate_mitigation, MitigationScenario,
    MitigationSimulation,
};
pub use stats::{AssetStats, RiskStats, SafeguardStats, VulnerabilityStats};

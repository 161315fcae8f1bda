//! Per-entity statistics.
//!
//! Pure aggregations over catalog slices. These are the four
//! independently-fetchable sub-aggregates the portfolio aggregator fans
//! out over; each derives `Default` so a failed source degrades to an
//! all-zero value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mg_core::config::CriticalityWeights;
use mg_core::models::asset::Asset;
use mg_core::models::risk::{RiskLevel, RiskRecord};
use mg_core::models::safeguard::Safeguard;
use mg_core::models::vulnerability::Vulnerability;

use crate::criticality::compute_criticality;

/// Aggregate statistics over the asset catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetStats {
    pub total_assets: u64,
    pub total_economic_value: f64,
    /// Mean criticality score across the catalog.
    pub average_criticality: f64,
    /// Asset counts grouped by criticality label.
    #[serde(default)]
    pub by_criticality: HashMap<String, u64>,
}

impl AssetStats {
    /// Computes asset statistics, deriving criticality per asset.
    pub fn from_assets(assets: &[Asset], weights: &CriticalityWeights) -> Self {
        let mut by_criticality: HashMap<String, u64> = HashMap::new();
        let mut total_economic_value = 0.0;
        let mut criticality_sum = 0.0;

        for asset in assets {
            let criticality = compute_criticality(asset, weights);
            criticality_sum += criticality.score;
            total_economic_value += asset.economic_value;
            *by_criticality
                .entry(criticality.label.as_str().to_string())
                .or_insert(0) += 1;
        }

        let average_criticality = if assets.is_empty() {
            0.0
        } else {
            criticality_sum / assets.len() as f64
        };

        Self {
            total_assets: assets.len() as u64,
            total_economic_value,
            average_criticality,
            by_criticality,
        }
    }
}

/// Aggregate statistics over the risk records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskStats {
    pub total_risks: u64,
    pub critical_risks: u64,
    pub high_risks: u64,
    /// Mean residual risk across the records.
    pub average_residual: f64,
    #[serde(default)]
    pub by_level: HashMap<String, u64>,
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
    #[serde(default)]
    pub by_treatment: HashMap<String, u64>,
}

impl RiskStats {
    /// Computes risk statistics from the stored derived fields.
    pub fn from_records(records: &[RiskRecord]) -> Self {
        let mut by_level: HashMap<String, u64> = HashMap::new();
        let mut by_status: HashMap<String, u64> = HashMap::new();
        let mut by_treatment: HashMap<String, u64> = HashMap::new();
        let mut residual_sum = 0.0;
        let mut critical_risks = 0;
        let mut high_risks = 0;

        for record in records {
            residual_sum += record.residual_risk;
            match record.risk_level {
                RiskLevel::Critical => critical_risks += 1,
                RiskLevel::High => high_risks += 1,
                _ => {}
            }
            *by_level
                .entry(record.risk_level.as_str().to_string())
                .or_insert(0) += 1;
            *by_status
                .entry(record.status.as_str().to_string())
                .or_insert(0) += 1;
            *by_treatment
                .entry(record.treatment.as_str().to_string())
                .or_insert(0) += 1;
        }

        let average_residual = if records.is_empty() {
            0.0
        } else {
            residual_sum / records.len() as f64
        };

        Self {
            total_risks: records.len() as u64,
            critical_risks,
            high_risks,
            average_residual,
            by_level,
            by_status,
            by_treatment,
        }
    }
}

/// Aggregate statistics over the vulnerability catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnerabilityStats {
    pub total_vulnerabilities: u64,
    /// Vulnerabilities still representing open exposure.
    pub active_vulnerabilities: u64,
    /// Open vulnerabilities with exploitability of 8 or more.
    pub critical_vulnerabilities: u64,
    pub average_exploitability: f64,
}

impl VulnerabilityStats {
    pub fn from_vulnerabilities(vulnerabilities: &[Vulnerability]) -> Self {
        let mut active_vulnerabilities = 0;
        let mut critical_vulnerabilities = 0;
        let mut exploitability_sum = 0.0;

        for vulnerability in vulnerabilities {
            exploitability_sum += vulnerability.exploitability;
            if vulnerability.is_open() {
                active_vulnerabilities += 1;
                if vulnerability.exploitability >= 8.0 {
                    critical_vulnerabilities += 1;
                }
            }
        }

        let average_exploitability = if vulnerabilities.is_empty() {
            0.0
        } else {
            exploitability_sum / vulnerabilities.len() as f64
        };

        Self {
            total_vulnerabilities: vulnerabilities.len() as u64,
            active_vulnerabilities,
            critical_vulnerabilities,
            average_exploitability,
        }
    }
}

/// Aggregate statistics over the safeguard catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeguardStats {
    pub total_safeguards: u64,
    /// Safeguards in a mitigation-contributing status.
    pub implemented_safeguards: u64,
    /// Mean stated effectiveness (percent) of the contributing safeguards.
    pub average_effectiveness: f64,
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
}

impl SafeguardStats {
    pub fn from_safeguards(safeguards: &[Safeguard]) -> Self {
        let mut by_status: HashMap<String, u64> = HashMap::new();
        let mut implemented = 0;
        let mut effectiveness_sum = 0.0;

        for safeguard in safeguards {
            *by_status
                .entry(safeguard.status.as_str().to_string())
                .or_insert(0) += 1;
            if safeguard.contributes_mitigation() {
                implemented += 1;
                effectiveness_sum += safeguard.effectiveness;
            }
        }

        let average_effectiveness = if implemented == 0 {
            0.0
        } else {
            effectiveness_sum / implemented as f64
        };

        Self {
            total_safeguards: safeguards.len() as u64,
            implemented_safeguards: implemented,
            average_effectiveness,
            by_status,
        }
    }
}

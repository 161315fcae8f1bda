//! Daily aggregate snapshots for trend reporting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Counts captured once per day for dashboard trend charts.
///
/// Snapshots are appended by the service layer; days with no snapshot are
/// reported as zero-count buckets, never omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// UTC calendar day this snapshot covers.
    pub date: NaiveDate,
    /// Number of risk records at end of day.
    pub risks: u64,
    /// Number of open vulnerabilities at end of day.
    pub vulnerabilities: u64,
    /// Number of mitigation-contributing safeguards at end of day.
    pub safeguards: u64,
}

impl DailySnapshot {
    /// Creates a snapshot for the given day.
    pub fn new(date: NaiveDate, risks: u64, vulnerabilities: u64, safeguards: u64) -> Self {
        Self {
            date,
            risks,
            vulnerabilities,
            safeguards,
        }
    }

    /// An all-zero snapshot for a day with no recorded data.
    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, 0, 0, 0)
    }
}

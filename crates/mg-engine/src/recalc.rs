//! Bulk recalculation of risk record derived fields.
//!
//! The coordinator is the only stateful component of the engine. It holds a
//! single-flight flag: one pass at a time, concurrent triggers rejected
//! immediately with `Conflict` rather than queued, because interleaved
//! passes over the same record set could produce an inconsistent final
//! state. Records are processed in ascending code order so run logs are
//! reproducible; a per-record failure is recorded and skipped, never fatal
//! to the pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use mg_core::error::EngineError;
use mg_core::repo::RiskRecordRepository;

use crate::calculator::RiskCalculator;

/// A record that could not be recalculated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    pub record_id: Uuid,
    pub code: String,
    pub reason: String,
}

/// Outcome of one recalculation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecalcReport {
    /// Records visited.
    pub processed: u64,
    /// Records whose derived fields actually changed and were written back.
    pub updated: u64,
    /// Records skipped due to a per-record failure.
    pub failed: u64,
    /// The individual failures, in processing order.
    pub failures: Vec<RecordFailure>,
}

/// Resets the running flag when a pass ends, on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-flight coordinator for full-catalog recalculation.
pub struct RecalcCoordinator {
    calculator: RiskCalculator,
    records: Arc<dyn RiskRecordRepository>,
    running: AtomicBool,
}

impl RecalcCoordinator {
    pub fn new(calculator: RiskCalculator, records: Arc<dyn RiskRecordRepository>) -> Self {
        Self {
            calculator,
            records,
            running: AtomicBool::new(false),
        }
    }

    /// Whether a pass is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Re-runs the scorer over every risk record exactly once.
    ///
    /// Rejects with `Conflict` if a pass is already running; callers get
    /// immediate feedback and must retry later. Derived fields are written
    /// back only when they actually changed, so a second pass over
    /// unchanged data reports `updated = 0`.
    #[instrument(skip(self))]
    pub async fn recalculate_all(&self) -> Result<RecalcReport, EngineError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::Conflict(
                "recalculation already in progress".to_string(),
            ));
        }
        let _guard = RunningGuard(&self.running);

        let mut records = self.records.list_all().await?;
        // Deterministic order keeps run logs reproducible across passes.
        records.sort_by(|a, b| a.code.cmp(&b.code));

        let mut report = RecalcReport::default();
        for record in &records {
            report.processed += 1;
            match self.calculator.evaluate_record(record).await {
                Ok(derived) => {
                    if record.derived_changed(
                        derived.inherent_risk,
                        derived.residual_risk,
                        derived.risk_level,
                    ) {
                        match self
                            .records
                            .update_derived(
                                record.id,
                                derived.inherent_risk,
                                derived.residual_risk,
                                derived.risk_level,
                            )
                            .await
                        {
                            Ok(_) => {
                                report.updated += 1;
                                debug!(code = %record.code, "derived fields updated");
                            }
                            Err(err) => {
                                warn!(code = %record.code, error = %err, "write-back failed");
                                report.failed += 1;
                                report.failures.push(RecordFailure {
                                    record_id: record.id,
                                    code: record.code.clone(),
                                    reason: err.to_string(),
                                });
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(code = %record.code, error = %err, "record skipped");
                    report.failed += 1;
                    report.failures.push(RecordFailure {
                        record_id: record.id,
                        code: record.code.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed,
            updated = report.updated,
            failed = report.failed,
            "recalculation pass complete"
        );
        Ok(report)
    }

    /// Read-only integrity sweep: reports every record whose asset, threat,
    /// or safeguard reference no longer resolves, without writing anything.
    #[instrument(skip(self))]
    pub async fn verify_references(&self) -> Result<Vec<RecordFailure>, EngineError> {
        let mut records = self.records.list_all().await?;
        records.sort_by(|a, b| a.code.cmp(&b.code));

        let mut dangling = Vec::new();
        for record in &records {
            if let Err(err @ EngineError::DanglingReference { .. }) =
                self.calculator.evaluate_record(record).await
            {
                dangling.push(RecordFailure {
                    record_id: record.id,
                    code: record.code.clone(),
                    reason: err.to_string(),
                });
            }
        }
        Ok(dangling)
    }
}

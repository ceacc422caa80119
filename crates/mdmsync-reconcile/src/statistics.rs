//! Run statistics tracking for reconciliation.
//!
//! Tracks collection completeness, decisions and write results for one run.

use mdmsync_connector::Collected;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

use crate::outcome::WriteStatus;
use crate::types::ActionKind;

/// Statistics for a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Partitions queried.
    #[serde(default)]
    pub spaces_scanned: u32,
    /// Records the MDM declared across all searches.
    #[serde(default)]
    pub records_declared: u64,
    /// Records actually collected.
    #[serde(default)]
    pub records_collected: u64,
    /// Search pages skipped after an error.
    #[serde(default)]
    pub failed_pages: u32,
    /// Directory records fetched.
    #[serde(default)]
    pub directory_records: u64,
    /// Devices a policy was evaluated against.
    #[serde(default)]
    pub devices_evaluated: u32,
    /// Devices filtered out before evaluation (wrong platform, stale, ...).
    #[serde(default)]
    pub devices_out_of_scope: u32,
    /// Evaluated devices already in the desired state.
    #[serde(default)]
    pub devices_unchanged: u32,
    /// Planned actions broken down by kind.
    #[serde(default)]
    pub actions_planned: BTreeMap<String, u32>,
    /// Writes the MDM accepted.
    #[serde(default)]
    pub writes_succeeded: u32,
    /// Writes the MDM rejected or that never reached it.
    #[serde(default)]
    pub writes_failed: u32,
    /// Writes skipped because of dry-run mode.
    #[serde(default)]
    pub writes_dry_run: u32,
    /// Writes held back because the evidence behind them lost pages.
    #[serde(default)]
    pub writes_withheld: u32,
    /// Per-device lookups (e.g. config listings) that failed.
    #[serde(default)]
    pub lookups_failed: u32,
    /// Total duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

impl RunStatistics {
    /// Create new empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one pagination walk.
    pub fn record_collection<T>(&mut self, collected: &Collected<T>) {
        self.records_declared += collected.declared_total.unwrap_or(0);
        self.records_collected += collected.records.len() as u64;
        self.failed_pages += collected.failed_pages;
    }

    /// Records declared but not collected.
    #[must_use]
    pub fn discrepancy(&self) -> u64 {
        self.records_declared.saturating_sub(self.records_collected)
    }

    pub fn record_planned(&mut self, kind: ActionKind) {
        *self.actions_planned.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Get count for a specific action kind.
    #[must_use]
    pub fn planned_count(&self, kind: ActionKind) -> u32 {
        self.actions_planned
            .get(&kind.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Total planned writes.
    #[must_use]
    pub fn planned_writes(&self) -> u32 {
        self.planned_count(ActionKind::Set) + self.planned_count(ActionKind::Delete)
    }

    pub fn record_write(&mut self, status: WriteStatus) {
        match status {
            WriteStatus::Success => self.writes_succeeded += 1,
            WriteStatus::Failed => self.writes_failed += 1,
            WriteStatus::DryRun => self.writes_dry_run += 1,
            WriteStatus::Withheld => self.writes_withheld += 1,
        }
    }

    /// True when anything was skipped or rejected.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_pages > 0 || self.writes_failed > 0 || self.lookups_failed > 0
    }

    /// Stamp the duration from a start instant.
    pub fn finish(&mut self, started: Instant) {
        self.duration_ms = started.elapsed().as_millis() as u64;
    }

    /// Emit the run summary to the log.
    pub fn log_summary(&self, job: &str) {
        info!(
            job = %job,
            spaces = self.spaces_scanned,
            declared = self.records_declared,
            collected = self.records_collected,
            evaluated = self.devices_evaluated,
            unchanged = self.devices_unchanged,
            planned = self.planned_writes(),
            succeeded = self.writes_succeeded,
            failed = self.writes_failed,
            dry_run = self.writes_dry_run,
            withheld = self.writes_withheld,
            duration_ms = self.duration_ms,
            "Run complete"
        );

        if self.failed_pages > 0 || self.discrepancy() > 0 {
            warn!(
                job = %job,
                failed_pages = self.failed_pages,
                missing_records = self.discrepancy(),
                withheld = self.writes_withheld,
                "Collection was incomplete"
            );
        }
    }
}

//! Job report generation.
//!
//! A job produces one [`JobReport`]: a flat table of per-device rows plus
//! the run statistics. Rendering is left to a [`ReportSink`].

use chrono::{DateTime, Utc};
use mdmsync_connector::Device;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use super::statistics::RunStatistics;

/// Complete job report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    /// Run ID.
    pub run_id: Uuid,
    /// Job name (CLI subcommand).
    pub job: String,
    /// Output name without date or extension.
    pub file_stem: String,
    /// Column headers.
    pub columns: Vec<String>,
    /// One row per reported device, aligned with `columns`.
    pub rows: Vec<Vec<String>>,
    /// Statistics.
    pub statistics: RunStatistics,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobReport {
    /// Start an empty report.
    #[must_use]
    pub fn new(job: impl Into<String>, file_stem: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            job: job.into(),
            file_stem: file_stem.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
            statistics: RunStatistics::default(),
            dry_run: false,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Append a row. Short rows are padded with empty cells, long rows
    /// truncated, so every row matches the header.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Seal the report with its final statistics.
    pub fn complete(&mut self, statistics: RunStatistics) {
        self.statistics = statistics;
        self.completed_at = Some(Utc::now());
    }
}

/// What a sink did with a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report had no rows; nothing was produced.
    Skipped,
    Written { path: PathBuf, rows: usize },
}

/// Report rendering failure.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report: {message}")]
    Encode { message: String },
}

/// Renders job reports. An empty report must yield [`ReportOutcome::Skipped`].
pub trait ReportSink {
    fn write(&self, report: &JobReport) -> Result<ReportOutcome, ReportError>;
}

/// Text of an optional cell.
pub fn cell<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// `uid, id, deviceModel, prettyModel, deviceName, serialNumber`.
pub const DEVICE_IDENTITY_COLUMNS: [&str; 6] = [
    "uid",
    "id",
    "deviceModel",
    "prettyModel",
    "deviceName",
    "serialNumber",
];

/// Cells for [`DEVICE_IDENTITY_COLUMNS`].
pub fn device_identity(device: &Device) -> Vec<String> {
    vec![
        device.uid.clone(),
        device.id.to_string(),
        cell(device.device_model.as_ref()),
        cell(device.pretty_model.as_ref()),
        cell(device.device_name.as_ref()),
        cell(device.serial_number.as_ref()),
    ]
}

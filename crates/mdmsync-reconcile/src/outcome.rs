//! Write outcome types
//!
//! Per-device results of an attribute write, used only for counting and
//! reporting.

use chrono::{DateTime, Utc};
use mdmsync_connector::ConnectorError;
use serde::{Deserialize, Serialize};

use crate::types::Action;

/// Status of a single write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    /// The MDM accepted the write
    Success,
    /// The write failed (transport or HTTP error)
    Failed,
    /// Dry-run mode; nothing was sent
    DryRun,
    /// Not sent because the evidence behind it was incomplete
    Withheld,
}

/// Result of applying one action to one device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Device the action targeted
    pub device_id: i64,
    /// Action that was applied
    pub action: Action,
    /// Result status
    pub status: WriteStatus,
    /// Error code and message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// When the write was attempted
    pub executed_at: DateTime<Utc>,
}

impl MutationOutcome {
    /// Create a successful result
    pub fn success(device_id: i64, action: Action) -> Self {
        Self::with_status(device_id, action, WriteStatus::Success)
    }

    /// Create a dry-run result
    pub fn dry_run(device_id: i64, action: Action) -> Self {
        Self::with_status(device_id, action, WriteStatus::DryRun)
    }

    /// Create a result for a write held back on incomplete evidence
    pub fn withheld(device_id: i64, action: Action) -> Self {
        Self::with_status(device_id, action, WriteStatus::Withheld)
    }

    /// Create a failed result
    pub fn failed(device_id: i64, action: Action, error: &ConnectorError) -> Self {
        Self {
            error: Some(error.to_string()),
            error_code: Some(error.report_code()),
            ..Self::with_status(device_id, action, WriteStatus::Failed)
        }
    }

    fn with_status(device_id: i64, action: Action, status: WriteStatus) -> Self {
        Self {
            device_id,
            action,
            status,
            error: None,
            error_code: None,
            executed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == WriteStatus::Success
    }

    pub fn is_failure(&self) -> bool {
        self.status == WriteStatus::Failed
    }

    /// Short result label for report rows.
    pub fn result_code(&self) -> String {
        match self.status {
            WriteStatus::Success => "ok".to_string(),
            WriteStatus::DryRun => "dry-run".to_string(),
            WriteStatus::Withheld => "withheld".to_string(),
            WriteStatus::Failed => self
                .error_code
                .clone()
                .unwrap_or_else(|| "failed".to_string()),
        }
    }
}

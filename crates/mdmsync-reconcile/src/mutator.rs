//! Attribute write execution for reconciliation.
//!
//! Applies planned actions against the MDM custom-attribute store. A SET
//! always sends the device's full attribute map with the one key replaced;
//! a DELETE goes through the dedicated removal endpoint. Failures are
//! recorded, not retried or rolled back.

use mdmsync_connector::{CustomAttributes, Device, MdmApi};

use crate::outcome::MutationOutcome;
use crate::reconciler::PlannedAction;
use crate::statistics::RunStatistics;
use crate::types::Action;

/// New attribute map for a SET: a copy of `existing` with `key` replaced.
pub fn merge_attributes(
    existing: &CustomAttributes,
    key: &str,
    values: &[String],
) -> CustomAttributes {
    existing.with_value(key, values.to_vec())
}

/// Executor for attribute writes.
pub struct AttributeMutator<'a> {
    mdm: &'a dyn MdmApi,
    dry_run: bool,
}

impl<'a> AttributeMutator<'a> {
    pub fn new(mdm: &'a dyn MdmApi) -> Self {
        Self { mdm, dry_run: false }
    }

    /// Set dry run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply one action to one device.
    ///
    /// Returns `None` for [`Action::NoAction`]; nothing is sent and nothing
    /// is reported.
    pub async fn apply(&self, device: &Device, action: &Action) -> Option<MutationOutcome> {
        if !action.is_write() {
            return None;
        }

        tracing::info!(
            device_id = device.id,
            action = %action,
            dry_run = %self.dry_run,
            "Executing attribute action"
        );

        if self.dry_run {
            return Some(MutationOutcome::dry_run(device.id, action.clone()));
        }

        let result = match action {
            Action::NoAction => return None,
            Action::SetAttribute { key, values } => {
                let merged = merge_attributes(&device.custom_attributes, key, values);
                self.mdm.put_custom_attributes(device.id, &merged).await
            }
            Action::DeleteAttribute { key } => {
                self.mdm
                    .delete_custom_attributes(&[device.id], std::slice::from_ref(key))
                    .await
            }
        };

        let outcome = match result {
            Ok(()) => MutationOutcome::success(device.id, action.clone()),
            Err(e) => {
                tracing::warn!(
                    device_id = device.id,
                    action = %action,
                    error = %e,
                    transport = %e.is_transport(),
                    "Attribute write failed"
                );
                MutationOutcome::failed(device.id, action.clone(), &e)
            }
        };
        Some(outcome)
    }

    /// Apply every planned action in order, counting results into `stats`.
    pub async fn apply_all(
        &self,
        planned: &[PlannedAction],
        stats: &mut RunStatistics,
    ) -> Vec<MutationOutcome> {
        let mut outcomes = Vec::with_capacity(planned.len());
        for entry in planned {
            if let Some(outcome) = self.apply(&entry.device, &entry.action).await {
                stats.record_write(outcome.status);
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}

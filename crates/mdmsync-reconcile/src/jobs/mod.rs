//! Reconciliation jobs
//!
//! One module per operator job. Every job follows the same shape: select
//! spaces, collect devices, decide per device, write, report.

pub mod amp_cleanup;
pub mod app_tag;
pub mod clear_configs;
pub mod ownership;
pub mod release_channel;

use mdmsync_connector::{Device, DirectoryApi, DirectorySnapshot, MdmApi, Space};
use tracing::{info, warn};

use crate::error::{JobError, JobResult};
use crate::inventory::{InventorySource, SpaceFilter};
use crate::mutator::AttributeMutator;
use crate::outcome::{MutationOutcome, WriteStatus};
use crate::policy::ReconcilePolicy;
use crate::reconciler::{PlannedAction, Reconciler};
use crate::statistics::RunStatistics;
use crate::types::Action;

/// Backends and run-wide switches shared by every job.
#[derive(Clone)]
pub struct JobContext<'a> {
    pub mdm: &'a dyn MdmApi,
    pub directory: Option<&'a dyn DirectoryApi>,
    pub dry_run: bool,
    /// Overrides the job's default space selection.
    pub space_filter: Option<SpaceFilter>,
}

impl<'a> JobContext<'a> {
    pub fn new(mdm: &'a dyn MdmApi) -> Self {
        Self {
            mdm,
            directory: None,
            dry_run: false,
            space_filter: None,
        }
    }

    #[must_use]
    pub fn with_directory(mut self, directory: &'a dyn DirectoryApi) -> Self {
        self.directory = Some(directory);
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_space_filter(mut self, filter: Option<SpaceFilter>) -> Self {
        self.space_filter = filter;
        self
    }

    pub fn inventory(&self) -> InventorySource<'a> {
        InventorySource::new(self.mdm)
    }

    pub fn mutator(&self) -> AttributeMutator<'a> {
        AttributeMutator::new(self.mdm).with_dry_run(self.dry_run)
    }

    /// Spaces to scan: the override if one was given, else `default`.
    pub async fn spaces(
        &self,
        default: SpaceFilter,
        stats: &mut RunStatistics,
    ) -> JobResult<Vec<Space>> {
        let filter = self.space_filter.clone().unwrap_or(default);
        let spaces = self.inventory().spaces(&filter).await?;
        stats.spaces_scanned += spaces.len() as u32;
        Ok(spaces)
    }

    /// Every device in the selected spaces.
    pub async fn devices(
        &self,
        default: SpaceFilter,
        stats: &mut RunStatistics,
    ) -> JobResult<Vec<Device>> {
        let spaces = self.spaces(default, stats).await?;
        let collected = self.inventory().devices_in(&spaces).await;
        stats.record_collection(&collected);
        Ok(collected.records)
    }

    /// Snapshot the directory. Lost pages are counted, not fatal; callers
    /// pass [`Evidence::of`] the snapshot's failed pages to [`reconcile`].
    pub async fn directory_snapshot(
        &self,
        stats: &mut RunStatistics,
    ) -> JobResult<DirectorySnapshot> {
        let directory = self.directory.ok_or(JobError::MissingBackend("directory"))?;
        let snapshot = DirectorySnapshot::fetch(directory).await;

        if snapshot.failed_pages() > 0 {
            warn!(
                failed_pages = snapshot.failed_pages(),
                serials = snapshot.len(),
                "Directory walk incomplete, absence-based writes will be withheld"
            );
        }

        stats.failed_pages += snapshot.failed_pages();
        stats.directory_records += snapshot.len() as u64;
        Ok(snapshot)
    }
}

/// Whether the evidence a policy was built from is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Complete,
    /// Some pages were lost; a device missing from the evidence may simply
    /// have been on one of them.
    Partial,
}

impl Evidence {
    pub fn of(failed_pages: u32) -> Self {
        if failed_pages > 0 {
            Evidence::Partial
        } else {
            Evidence::Complete
        }
    }
}

/// A write that was planned and then attempted.
#[derive(Debug, Clone)]
pub struct AppliedAction {
    pub device: Device,
    pub action: Action,
    pub outcome: MutationOutcome,
}

/// Plan with `policy` and apply the writes in collection order.
///
/// With [`Evidence::Partial`], writes the policy bases on absence are not
/// sent; they are reported and counted as withheld.
pub async fn reconcile(
    ctx: &JobContext<'_>,
    policy: &dyn ReconcilePolicy,
    devices: &[Device],
    evidence: Evidence,
    stats: &mut RunStatistics,
) -> Vec<AppliedAction> {
    let plan = Reconciler::new(policy).plan_into(devices, stats);
    if plan.is_empty() {
        info!(policy = policy.name(), "Nothing to change");
        return Vec::new();
    }

    let withhold = |entry: &PlannedAction| {
        evidence == Evidence::Partial && policy.relies_on_absence(&entry.action)
    };
    let writable: Vec<PlannedAction> = plan
        .actions
        .iter()
        .filter(|&entry| !withhold(entry))
        .cloned()
        .collect();

    // Plans only hold writes, so outcomes line up one to one.
    let mut written = ctx.mutator().apply_all(&writable, stats).await.into_iter();
    let mut applied = Vec::with_capacity(plan.actions.len());
    for entry in plan.actions {
        let outcome = if withhold(&entry) {
            warn!(
                device_id = entry.device.id,
                action = %entry.action,
                "Withholding write on incomplete evidence"
            );
            stats.record_write(WriteStatus::Withheld);
            MutationOutcome::withheld(entry.device.id, entry.action.clone())
        } else {
            match written.next() {
                Some(outcome) => outcome,
                None => break,
            }
        };
        applied.push(AppliedAction {
            device: entry.device,
            action: entry.action,
            outcome,
        });
    }
    applied
}

//! `amp-cleanup`: keep the Cisco AMP exclusion attribute in step with the
//! activation policy on Android devices.

use mdmsync_connector::AppPlatform;
use std::collections::HashSet;
use std::time::Instant;
use tracing::warn;

use super::{reconcile, Evidence, JobContext};
use crate::error::{JobError, JobResult};
use crate::inventory::SpaceFilter;
use crate::policy::{AmpToggle, AMP_BUNDLE_ID, AMP_VIOLATION_POLICIES};
use crate::report::{cell, JobReport};
use crate::statistics::RunStatistics;

pub const JOB_NAME: &str = "amp-cleanup";
pub const FILE_STEM: &str = "amp_cleanup";

const COLUMNS: [&str; 6] = [
    "id",
    "clientDeviceIdentifier",
    "space_Id",
    "serialNumber",
    "change_action",
    "status_code",
];

#[derive(Debug, Clone)]
pub struct AmpCleanupOptions {
    /// Policy names whose violation marks a device as needing the exclusion.
    pub violation_policies: Vec<String>,
    pub bundle_id: String,
}

impl Default for AmpCleanupOptions {
    fn default() -> Self {
        Self {
            violation_policies: AMP_VIOLATION_POLICIES.iter().map(|p| (*p).to_string()).collect(),
            bundle_id: AMP_BUNDLE_ID.to_string(),
        }
    }
}

pub fn default_spaces() -> SpaceFilter {
    SpaceFilter::exclude(["Shared Devices", "macOS"])
}

/// Run the job.
///
/// The app inventory is collected before any decision. If it lost pages, a
/// device on a missing page would look uninstalled, so "removed" writes are
/// withheld for that run while activations still go out.
pub async fn run(ctx: &JobContext<'_>, options: &AmpCleanupOptions) -> JobResult<JobReport> {
    if options.violation_policies.is_empty() {
        return Err(JobError::invalid_options("at least one violation policy is required"));
    }

    let started = Instant::now();
    let mut stats = RunStatistics::new();
    let mut report = JobReport::new(JOB_NAME, FILE_STEM, &COLUMNS).with_dry_run(ctx.dry_run);

    let spaces = ctx.spaces(default_spaces(), &mut stats).await?;
    let inventory = ctx.inventory();

    let installed = inventory
        .app_inventory_in(&spaces, &options.bundle_id, AppPlatform::Android)
        .await;
    stats.record_collection(&installed);
    let evidence = Evidence::of(installed.failed_pages);
    if evidence == Evidence::Partial {
        warn!(
            bundle_id = %options.bundle_id,
            failed_pages = installed.failed_pages,
            "App inventory incomplete, removals will be withheld"
        );
    }
    let app_installed: HashSet<i64> = installed.records.iter().map(|r| r.device.id).collect();

    let devices = inventory.devices_in(&spaces).await;
    stats.record_collection(&devices);

    let policy =
        AmpToggle::new(app_installed).with_violation_policies(options.violation_policies.clone());
    for applied in reconcile(ctx, &policy, &devices.records, evidence, &mut stats).await {
        let device = &applied.device;
        report.push_row(vec![
            device.id.to_string(),
            cell(device.client_device_identifier.as_ref()),
            device
                .space
                .as_ref()
                .map(|s| s.id.to_string())
                .unwrap_or_default(),
            cell(device.serial_number.as_ref()),
            applied.action.to_string(),
            applied.outcome.result_code(),
        ]);
    }

    stats.finish(started);
    stats.log_summary(JOB_NAME);
    report.complete(stats);
    Ok(report)
}

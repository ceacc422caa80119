//! `ownership`: mark Macs as company-owned when the asset directory knows
//! their serial.

use std::time::Instant;

use super::{reconcile, Evidence, JobContext};
use crate::error::JobResult;
use crate::inventory::SpaceFilter;
use crate::policy::OwnershipClassification;
use crate::report::{device_identity, JobReport, DEVICE_IDENTITY_COLUMNS};
use crate::statistics::RunStatistics;

pub const JOB_NAME: &str = "ownership";
pub const FILE_STEM: &str = "ownership";

pub fn default_spaces() -> SpaceFilter {
    SpaceFilter::only(["macOS", "Bleeding Edge"])
}

fn columns() -> Vec<&'static str> {
    let mut columns = DEVICE_IDENTITY_COLUMNS.to_vec();
    columns.extend(["in_directory", "action_taken", "result"]);
    columns
}

/// Run the job. Needs the directory backend.
///
/// If the directory walk lost pages, "No" writes are withheld: an owned
/// Mac on a lost page would otherwise be marked personal.
pub async fn run(ctx: &JobContext<'_>) -> JobResult<JobReport> {
    let started = Instant::now();
    let mut stats = RunStatistics::new();
    let mut report = JobReport::new(JOB_NAME, FILE_STEM, &columns()).with_dry_run(ctx.dry_run);

    let directory = ctx.directory_snapshot(&mut stats).await?;
    let evidence = Evidence::of(directory.failed_pages());
    let devices = ctx.devices(default_spaces(), &mut stats).await?;

    let policy = OwnershipClassification::new(&directory);
    for applied in reconcile(ctx, &policy, &devices, evidence, &mut stats).await {
        let mut row = device_identity(&applied.device);
        row.push(policy.in_directory(&applied.device).to_string());
        row.push(applied.action.to_string());
        row.push(applied.outcome.result_code());
        report.push_row(row);
    }

    stats.finish(started);
    stats.log_summary(JOB_NAME);
    report.complete(stats);
    Ok(report)
}

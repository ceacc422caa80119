//! `release-channel`: move phase-tester Macs onto the pre-production channel
//! and take everyone else off it.

use std::time::Instant;
use tracing::info;

use super::{reconcile, Evidence, JobContext};
use crate::error::JobResult;
use crate::inventory::SpaceFilter;
use crate::policy::ChannelPromotion;
use crate::report::{device_identity, JobReport, DEVICE_IDENTITY_COLUMNS};
use crate::statistics::RunStatistics;

pub const JOB_NAME: &str = "release-channel";
pub const FILE_STEM: &str = "release_channel";

pub fn default_spaces() -> SpaceFilter {
    SpaceFilter::only(["macOS"])
}

fn columns() -> Vec<&'static str> {
    let mut columns = DEVICE_IDENTITY_COLUMNS.to_vec();
    columns.extend(["action_taken", "action_result"]);
    columns
}

/// Run the job. Needs the directory backend. Demotions are withheld when
/// the directory walk lost pages.
pub async fn run(ctx: &JobContext<'_>) -> JobResult<JobReport> {
    let started = Instant::now();
    let mut stats = RunStatistics::new();
    let mut report = JobReport::new(JOB_NAME, FILE_STEM, &columns()).with_dry_run(ctx.dry_run);

    let directory = ctx.directory_snapshot(&mut stats).await?;
    let evidence = Evidence::of(directory.failed_pages());
    let policy = ChannelPromotion::from_directory(&directory);
    info!(
        phase_testers = policy.phase_tester_count(),
        non_testers = policy.non_tester_count(),
        "Classified directory"
    );

    let devices = ctx.devices(default_spaces(), &mut stats).await?;
    for applied in reconcile(ctx, &policy, &devices, evidence, &mut stats).await {
        let mut row = device_identity(&applied.device);
        row.push(applied.action.to_string());
        row.push(applied.outcome.result_code());
        report.push_row(row);
    }

    stats.finish(started);
    stats.log_summary(JOB_NAME);
    report.complete(stats);
    Ok(report)
}

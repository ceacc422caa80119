//! `clear-configs`: clear stuck configurations on recently active Macs.

use chrono::{Duration, Utc};
use std::time::Instant;

use super::JobContext;
use crate::config_sweep::{ConfigSweep, FreshnessGate, DEFAULT_FRESHNESS_DAYS};
use crate::error::{JobError, JobResult};
use crate::inventory::SpaceFilter;
use crate::report::{cell, JobReport};
use crate::statistics::RunStatistics;

pub const JOB_NAME: &str = "clear-configs";
pub const FILE_STEM: &str = "clear_configs";

const COLUMNS: [&str; 9] = [
    "id",
    "last_checkin",
    "deviceModel",
    "prettyModel",
    "deviceName",
    "serialNumber",
    "uid",
    "total_stuck_configs",
    "stuck_configs",
];

#[derive(Debug, Clone)]
pub struct ClearConfigsOptions {
    /// Devices that have not checked in for longer are left alone.
    pub freshness_days: i64,
}

impl Default for ClearConfigsOptions {
    fn default() -> Self {
        Self {
            freshness_days: DEFAULT_FRESHNESS_DAYS,
        }
    }
}

pub fn default_spaces() -> SpaceFilter {
    SpaceFilter::exclude(["Shared Devices"])
}

/// Run the job.
pub async fn run(ctx: &JobContext<'_>, options: &ClearConfigsOptions) -> JobResult<JobReport> {
    if options.freshness_days <= 0 {
        return Err(JobError::invalid_options("freshness window must be at least one day"));
    }
    let window = Duration::try_days(options.freshness_days)
        .ok_or_else(|| JobError::invalid_options("freshness window is out of range"))?;

    let started = Instant::now();
    let mut stats = RunStatistics::new();
    let mut report = JobReport::new(JOB_NAME, FILE_STEM, &COLUMNS).with_dry_run(ctx.dry_run);

    let devices = ctx.devices(default_spaces(), &mut stats).await?;

    let gate = FreshnessGate::new(window, Utc::now());
    let sweep = ConfigSweep::new(ctx.mdm, gate).with_dry_run(ctx.dry_run);
    for outcome in sweep.sweep(&devices, &mut stats).await {
        let device = &outcome.device;
        report.push_row(vec![
            device.id.to_string(),
            device
                .last_checkin_at()
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            cell(device.device_model.as_ref()),
            cell(device.pretty_model.as_ref()),
            cell(device.device_name.as_ref()),
            cell(device.serial_number.as_ref()),
            device.uid.clone(),
            outcome.configs.len().to_string(),
            outcome.summary(),
        ]);
    }

    stats.finish(started);
    stats.log_summary(JOB_NAME);
    report.complete(stats);
    Ok(report)
}

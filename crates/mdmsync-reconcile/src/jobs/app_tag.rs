//! `app-tag`: inventory an app across spaces and optionally tag its devices.

use mdmsync_connector::{AppInventoryRecord, AppPlatform, Device};
use std::collections::HashMap;
use std::time::Instant;

use super::{reconcile, Evidence, JobContext};
use crate::error::{JobError, JobResult};
use crate::inventory::SpaceFilter;
use crate::policy::AppPresenceTag;
use crate::report::{cell, JobReport};
use crate::statistics::RunStatistics;

pub const JOB_NAME: &str = "app-tag";

const INVENTORY_COLUMNS: [&str; 11] = [
    "id",
    "deviceModel",
    "deviceName",
    "platformType",
    "platformVersion",
    "registrationState",
    "emailAddress",
    "serialNumber",
    "space",
    "bundleId",
    "tag_result",
];

/// Which app to look for and what to tag it with.
#[derive(Debug, Clone, Default)]
pub struct AppTagOptions {
    /// Display name, used in the report name.
    pub app_name: String,
    pub ios_bundle_id: Option<String>,
    pub android_bundle_id: Option<String>,
    /// `(key, value)` to set on every device found. Without it the job only
    /// reports inventory.
    pub tag: Option<(String, String)>,
}

impl AppTagOptions {
    pub fn validate(&self) -> JobResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(JobError::invalid_options("app name must not be empty"));
        }
        if self.ios_bundle_id.is_none() && self.android_bundle_id.is_none() {
            return Err(JobError::invalid_options(
                "at least one of the iOS or Android bundle ids is required",
            ));
        }
        if let Some((key, _)) = &self.tag {
            if key.trim().is_empty() {
                return Err(JobError::invalid_options("attribute key must not be empty"));
            }
        }
        Ok(())
    }

    fn queries(&self) -> impl Iterator<Item = (&str, AppPlatform)> {
        [
            self.ios_bundle_id.as_deref().map(|b| (b, AppPlatform::Ios)),
            self.android_bundle_id
                .as_deref()
                .map(|b| (b, AppPlatform::Android)),
        ]
        .into_iter()
        .flatten()
    }

    /// Report name: `app_inventory_<app>`, with anything other than ASCII
    /// alphanumerics, `.`, `_` and `-` replaced by `_` so the name cannot
    /// leave the output directory.
    pub fn file_stem(&self) -> String {
        let app: String = self
            .app_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("app_inventory_{app}")
    }
}

pub fn default_spaces() -> SpaceFilter {
    SpaceFilter::exclude(["Shared Devices", "macOS"])
}

/// Run the job.
pub async fn run(ctx: &JobContext<'_>, options: &AppTagOptions) -> JobResult<JobReport> {
    options.validate()?;
    let started = Instant::now();
    let mut stats = RunStatistics::new();
    let mut report =
        JobReport::new(JOB_NAME, options.file_stem(), &INVENTORY_COLUMNS).with_dry_run(ctx.dry_run);

    let spaces = ctx.spaces(default_spaces(), &mut stats).await?;
    let inventory = ctx.inventory();

    let mut found: Vec<AppInventoryRecord> = Vec::new();
    for (bundle_id, platform) in options.queries() {
        let collected = inventory.app_inventory_in(&spaces, bundle_id, platform).await;
        stats.record_collection(&collected);
        found.extend(collected.records);
    }

    let mut results: HashMap<i64, String> = HashMap::new();
    if let Some((key, value)) = &options.tag {
        let devices: Vec<Device> = found.iter().map(|r| r.device.clone()).collect();
        let policy = AppPresenceTag::new(key, value);
        for applied in reconcile(ctx, &policy, &devices, Evidence::Complete, &mut stats).await {
            results.insert(applied.device.id, applied.outcome.result_code());
        }
    }

    for record in &found {
        let device = &record.device;
        let tag_result = match (&options.tag, results.get(&device.id)) {
            (None, _) => String::new(),
            (Some(_), Some(code)) => code.clone(),
            (Some(_), None) => "unchanged".to_string(),
        };
        report.push_row(vec![
            device.id.to_string(),
            cell(device.device_model.as_ref()),
            cell(device.device_name.as_ref()),
            device.platform_type.to_string(),
            cell(device.platform_version.as_ref()),
            device.registration_state.to_string(),
            cell(device.email_address.as_ref()),
            cell(device.serial_number.as_ref()),
            device
                .space
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            record.bundle_id.clone(),
            tag_result,
        ]);
    }

    stats.finish(started);
    stats.log_summary(JOB_NAME);
    report.complete(stats);
    Ok(report)
}

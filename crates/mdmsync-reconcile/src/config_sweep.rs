//! Config-error sweep
//!
//! Finds configurations stuck in a non-terminal state on recently active
//! Macs and asks the MDM to clear their error state.

use chrono::{DateTime, Duration, Utc};
use mdmsync_connector::{Device, DeviceConfig, MdmApi, PlatformType, RegistrationState};
use tracing::{debug, warn};

use crate::outcome::WriteStatus;
use crate::statistics::RunStatistics;

/// Config statuses that need no intervention.
pub const SETTLED_STATUSES: [&str; 3] = ["INSTALLED", "ACTIVE", "UNINSTALLED"];

/// Default check-in freshness window.
pub const DEFAULT_FRESHNESS_DAYS: i64 = 30;

/// True when a config is pending, errored or otherwise unsettled.
pub fn is_stuck(config: &DeviceConfig) -> bool {
    let status = config.status.to_uppercase();
    !SETTLED_STATUSES.contains(&status.as_str())
}

/// Admits active Macs that checked in within the window.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessGate {
    max_age: Duration,
    now: DateTime<Utc>,
}

impl FreshnessGate {
    pub fn new(max_age: Duration, now: DateTime<Utc>) -> Self {
        Self { max_age, now }
    }

    pub fn days(days: i64) -> Self {
        Self::new(Duration::days(days), Utc::now())
    }

    pub fn admits(&self, device: &Device) -> bool {
        if device.platform_type != PlatformType::Osx
            || device.registration_state != RegistrationState::Active
        {
            return false;
        }
        match device.last_checkin_at() {
            Some(seen) => self.now - seen <= self.max_age,
            None => false,
        }
    }
}

impl Default for FreshnessGate {
    fn default() -> Self {
        Self::days(DEFAULT_FRESHNESS_DAYS)
    }
}

/// One stuck config and what happened when clearing it.
#[derive(Debug, Clone)]
pub struct ClearedConfig {
    pub config: DeviceConfig,
    pub status: WriteStatus,
    pub result_code: String,
}

/// A device that had at least one stuck config.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub device: Device,
    pub configs: Vec<ClearedConfig>,
}

impl SweepOutcome {
    /// `name (status): result` for every stuck config, `;`-separated.
    pub fn summary(&self) -> String {
        self.configs
            .iter()
            .map(|c| format!("{} ({}): {}", c.config.name, c.config.status, c.result_code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Clears stuck configs device by device.
pub struct ConfigSweep<'a> {
    mdm: &'a dyn MdmApi,
    gate: FreshnessGate,
    dry_run: bool,
}

impl<'a> ConfigSweep<'a> {
    pub fn new(mdm: &'a dyn MdmApi, gate: FreshnessGate) -> Self {
        Self {
            mdm,
            gate,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sweep `devices` in order. Devices whose configs cannot be listed are
    /// skipped and counted as failed lookups.
    pub async fn sweep(&self, devices: &[Device], stats: &mut RunStatistics) -> Vec<SweepOutcome> {
        let mut outcomes = Vec::new();

        for device in devices {
            if !self.gate.admits(device) {
                stats.devices_out_of_scope += 1;
                continue;
            }
            stats.devices_evaluated += 1;

            let configs = match self.mdm.device_configs(device.id).await {
                Ok(configs) => configs,
                Err(e) => {
                    warn!(device_id = device.id, error = %e, "Could not list configs, skipping");
                    stats.lookups_failed += 1;
                    continue;
                }
            };

            let stuck: Vec<DeviceConfig> = configs.into_iter().filter(is_stuck).collect();
            if stuck.is_empty() {
                stats.devices_unchanged += 1;
                continue;
            }

            let mut cleared = Vec::with_capacity(stuck.len());
            for config in stuck {
                let (status, result_code) = self.clear(device.id, &config).await;
                stats.record_write(status);
                cleared.push(ClearedConfig {
                    config,
                    status,
                    result_code,
                });
            }

            outcomes.push(SweepOutcome {
                device: device.clone(),
                configs: cleared,
            });
        }

        outcomes
    }

    async fn clear(&self, device_id: i64, config: &DeviceConfig) -> (WriteStatus, String) {
        debug!(
            device_id = device_id,
            config_id = %config.id,
            config = %config.name,
            status = %config.status,
            dry_run = self.dry_run,
            "Clearing config error"
        );

        if self.dry_run {
            return (WriteStatus::DryRun, "dry-run".to_string());
        }

        match self.mdm.clear_config_error(device_id, &config.id).await {
            Ok(()) => (WriteStatus::Success, "ok".to_string()),
            Err(e) => {
                warn!(device_id = device_id, config_id = %config.id, error = %e, "Clear failed");
                (WriteStatus::Failed, e.report_code())
            }
        }
    }
}

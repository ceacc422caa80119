//! AMP-cleanup command - keep the Cisco AMP attribute in step with policy violations

use clap::Args;
use mdmsync_reconcile::jobs::amp_cleanup::{self, AmpCleanupOptions};

use super::{publish, Backends, JobArgs};
use crate::config::ConfigPaths;
use crate::error::CliResult;

/// Arguments for the amp-cleanup command
#[derive(Args, Debug)]
pub struct AmpCleanupArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Violation policy that marks a device (repeatable; defaults to the AMP activation policies)
    #[arg(long = "violation-policy", value_name = "NAME")]
    pub violation_policies: Vec<String>,

    /// Bundle id whose installation counts as AMP present
    #[arg(long, value_name = "BUNDLE_ID")]
    pub bundle_id: Option<String>,
}

impl AmpCleanupArgs {
    fn options(&self) -> AmpCleanupOptions {
        let mut options = AmpCleanupOptions::default();
        if !self.violation_policies.is_empty() {
            options.violation_policies = self.violation_policies.clone();
        }
        if let Some(bundle_id) = &self.bundle_id {
            options.bundle_id = bundle_id.clone();
        }
        options
    }
}

/// Execute the amp-cleanup command
pub async fn execute(args: AmpCleanupArgs, paths: &ConfigPaths) -> CliResult<()> {
    let options = args.options();

    let backends = Backends::connect(paths, false)?;
    let report = amp_cleanup::run(&backends.context(&args.job), &options).await?;
    publish(paths, &report)?;
    Ok(())
}

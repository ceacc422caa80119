//! Release-channel command - promote phase testers to the pre-production channel

use clap::Args;
use mdmsync_reconcile::jobs::release_channel;

use super::{publish, Backends, JobArgs};
use crate::config::ConfigPaths;
use crate::error::CliResult;

/// Arguments for the release-channel command
#[derive(Args, Debug)]
pub struct ReleaseChannelArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

/// Execute the release-channel command
pub async fn execute(args: ReleaseChannelArgs, paths: &ConfigPaths) -> CliResult<()> {
    let backends = Backends::connect(paths, true)?;
    let report = release_channel::run(&backends.context(&args.job)).await?;
    publish(paths, &report)?;
    Ok(())
}

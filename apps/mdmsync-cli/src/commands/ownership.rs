//! Ownership command - classify Macs against the asset directory

use clap::Args;
use mdmsync_reconcile::jobs::ownership;

use super::{publish, Backends, JobArgs};
use crate::config::ConfigPaths;
use crate::error::CliResult;

/// Arguments for the ownership command
#[derive(Args, Debug)]
pub struct OwnershipArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

/// Execute the ownership command
pub async fn execute(args: OwnershipArgs, paths: &ConfigPaths) -> CliResult<()> {
    let backends = Backends::connect(paths, true)?;
    let report = ownership::run(&backends.context(&args.job)).await?;
    publish(paths, &report)?;
    Ok(())
}

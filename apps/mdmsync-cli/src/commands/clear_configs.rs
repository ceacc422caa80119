//! Clear-configs command - clear config errors stuck on active Macs

use clap::Args;
use mdmsync_reconcile::jobs::clear_configs::{self, ClearConfigsOptions};
use mdmsync_reconcile::config_sweep::DEFAULT_FRESHNESS_DAYS;

use super::{publish, Backends, JobArgs};
use crate::config::ConfigPaths;
use crate::error::CliResult;

/// Arguments for the clear-configs command
#[derive(Args, Debug)]
pub struct ClearConfigsArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Only touch devices that checked in within this many days
    #[arg(long, default_value_t = DEFAULT_FRESHNESS_DAYS)]
    pub days: i64,
}

/// Execute the clear-configs command
pub async fn execute(args: ClearConfigsArgs, paths: &ConfigPaths) -> CliResult<()> {
    let options = ClearConfigsOptions {
        freshness_days: args.days,
    };

    let backends = Backends::connect(paths, false)?;
    let report = clear_configs::run(&backends.context(&args.job), &options).await?;
    publish(paths, &report)?;
    Ok(())
}

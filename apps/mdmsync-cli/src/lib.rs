//! mdmsync CLI library
//!
//! The command tree lives here so integration tests can drive commands
//! without spawning the binary.

pub mod commands;
pub mod config;
pub mod error;
pub mod formats;
pub mod logging;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::ConfigPaths;
use error::CliResult;
use logging::LogFormat;

/// mdmsync - reconcile MDM device attributes with inventory and asset data
#[derive(Parser, Debug)]
#[command(name = "mdmsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration directory (MDMSYNC_CONFIG_DIR takes precedence)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Debug logging for mdmsync crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inventory an app across spaces and optionally tag its devices
    AppTag(commands::app_tag::AppTagArgs),

    /// Set or clear the Cisco AMP attribute on Android devices
    AmpCleanup(commands::amp_cleanup::AmpCleanupArgs),

    /// Classify Macs as company-owned or not using the asset directory
    Ownership(commands::ownership::OwnershipArgs),

    /// Move phase-tester Macs onto the pre-production release channel
    ReleaseChannel(commands::release_channel::ReleaseChannelArgs),

    /// Clear stuck configuration errors on active Macs
    ClearConfigs(commands::clear_configs::ClearConfigsArgs),
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    let paths = ConfigPaths::resolve(cli.config_dir.as_deref())?;
    tracing::debug!(config_dir = %paths.config_dir.display(), "Using configuration directory");

    match cli.command {
        Commands::AppTag(args) => commands::app_tag::execute(args, &paths).await,
        Commands::AmpCleanup(args) => commands::amp_cleanup::execute(args, &paths).await,
        Commands::Ownership(args) => commands::ownership::execute(args, &paths).await,
        Commands::ReleaseChannel(args) => commands::release_channel::execute(args, &paths).await,
        Commands::ClearConfigs(args) => commands::clear_configs::execute(args, &paths).await,
    }
}

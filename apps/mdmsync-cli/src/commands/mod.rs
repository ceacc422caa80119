//! CLI command implementations
//!
//! One module per job. Each command loads settings and credentials, builds
//! the backend clients, runs its job and writes the report.

pub mod amp_cleanup;
pub mod app_tag;
pub mod clear_configs;
pub mod ownership;
pub mod release_channel;

use clap::Args;
use mdmsync_connector::{DirectoryClient, MdmClient};
use mdmsync_reconcile::{JobContext, JobError, JobReport, ReportOutcome, ReportSink, SpaceFilter};

use crate::config::{load_credentials, ConfigPaths, Settings};
use crate::error::CliResult;
use crate::formats::CsvReportSink;
use crate::output::print_summary;

/// Options every job accepts
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Compute and report decisions without writing to the MDM
    #[arg(long)]
    pub dry_run: bool,

    /// Only scan this space (repeatable; replaces the job's default selection)
    #[arg(long = "space", value_name = "NAME", conflicts_with = "exclude_spaces")]
    pub spaces: Vec<String>,

    /// Scan every space except this one (repeatable)
    #[arg(long = "exclude-space", value_name = "NAME")]
    pub exclude_spaces: Vec<String>,
}

impl JobArgs {
    /// Space selection override, if any was given
    pub fn space_filter(&self) -> Option<SpaceFilter> {
        if !self.spaces.is_empty() {
            Some(SpaceFilter::only(self.spaces.iter().cloned()))
        } else if !self.exclude_spaces.is_empty() {
            Some(SpaceFilter::exclude(self.exclude_spaces.iter().cloned()))
        } else {
            None
        }
    }
}

/// Clients for one run.
pub struct Backends {
    pub mdm: MdmClient,
    pub directory: Option<DirectoryClient>,
}

impl Backends {
    /// Load settings and credentials and build the clients. The directory
    /// client is only built when the job needs it.
    pub fn connect(paths: &ConfigPaths, with_directory: bool) -> CliResult<Self> {
        let settings = Settings::load(paths)?;

        let mdm_credentials = load_credentials(&paths.mdm_credentials_file)?;
        let mdm = MdmClient::with_endpoints(
            settings.mdm_backend(mdm_credentials),
            settings.mdm.endpoints.clone(),
        )?;
        tracing::debug!(base_url = %settings.mdm.base_url, "MDM client ready");

        let directory = if with_directory {
            if settings.directory.base_url.is_none() {
                return Err(JobError::MissingBackend("directory").into());
            }
            let credentials = load_credentials(&paths.directory_credentials_file)?;
            let config = settings
                .directory_backend(credentials)
                .ok_or(JobError::MissingBackend("directory"))?;
            Some(DirectoryClient::new(
                config,
                settings.directory.machines_path.clone(),
            )?)
        } else {
            None
        };

        Ok(Self { mdm, directory })
    }

    pub fn context(&self, args: &JobArgs) -> JobContext<'_> {
        let ctx = JobContext::new(&self.mdm)
            .with_dry_run(args.dry_run)
            .with_space_filter(args.space_filter());
        match &self.directory {
            Some(directory) => ctx.with_directory(directory),
            None => ctx,
        }
    }
}

/// Write the report to the results directory and print the run summary.
pub fn publish(paths: &ConfigPaths, report: &JobReport) -> CliResult<ReportOutcome> {
    paths.ensure_results_dir()?;
    let sink = CsvReportSink::new(paths.results_dir.clone());
    let outcome = sink.write(report)?;
    print_summary(report, &outcome);
    Ok(outcome)
}

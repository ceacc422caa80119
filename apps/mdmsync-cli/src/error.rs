//! CLI error types and exit codes

use mdmsync_connector::ConnectorError;
use mdmsync_reconcile::{JobError, ReportError};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success (including runs with skipped pages or failed writes)
/// - 1: General error (configuration, report output)
/// - 2: Authentication rejected
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials not found: {}", path.display())]
    CredentialsMissing { path: PathBuf },

    #[error("Invalid credentials file {}: {message}", path.display())]
    CredentialsInvalid { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_)
            | CliError::CredentialsMissing { .. }
            | CliError::CredentialsInvalid { .. } => 1,
            CliError::Validation(_) => 4,
            CliError::Connector(e) => connector_exit_code(e),
            CliError::Job(JobError::SpaceListing(e)) => connector_exit_code(e),
            CliError::Job(JobError::InvalidOptions(_)) => 4,
            CliError::Job(JobError::MissingBackend(_)) => 1,
            CliError::Report(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::CredentialsMissing { .. } => Some(
                "Create the file with {\"user\": \"...\", \"pass\": \"...\"} or point --config-dir at the right directory.",
            ),
            CliError::Job(JobError::MissingBackend(_)) => {
                Some("Set directory.base_url in settings.json.")
            }
            CliError::Job(JobError::SpaceListing(ConnectorError::AuthenticationFailed))
            | CliError::Connector(ConnectorError::AuthenticationFailed) => {
                Some("Check the user and pass in the MDM credentials file.")
            }
            _ => None,
        }
    }
}

fn connector_exit_code(error: &ConnectorError) -> i32 {
    match error {
        ConnectorError::AuthenticationFailed => 2,
        ConnectorError::InvalidConfiguration { .. } => 1,
        ConnectorError::InvalidData { .. } => 5,
        _ => match error.status_code() {
            Some(status) if status >= 500 => 5,
            Some(401 | 403) => 2,
            Some(_) => 4,
            None => 3,
        },
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

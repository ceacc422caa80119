//! Run-level errors.
//!
//! Per-page and per-device failures never surface here: they are counted in
//! [`crate::RunStatistics`] and reported. A `JobError` means the run could not
//! get far enough to decide anything.

use mdmsync_connector::ConnectorError;
use thiserror::Error;

/// Error that stops a job before any decision is made.
#[derive(Debug, Error)]
pub enum JobError {
    /// Partition listing failed, so there is nothing to scope queries on.
    #[error("failed to list spaces: {0}")]
    SpaceListing(#[source] ConnectorError),

    /// The job needs a backend that was not configured.
    #[error("{0} backend is not configured")]
    MissingBackend(&'static str),

    /// Job options are unusable.
    #[error("invalid job options: {0}")]
    InvalidOptions(String),
}

impl JobError {
    pub fn invalid_options(message: impl Into<String>) -> Self {
        JobError::InvalidOptions(message.into())
    }
}

/// Result type for job runs.
pub type JobResult<T> = Result<T, JobError>;

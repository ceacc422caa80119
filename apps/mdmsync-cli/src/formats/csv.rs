//! CSV report output
//!
//! Reports land in the results directory as `<stem>_<Mon-DD-YYYY>.csv`,
//! one header row from the report columns and one row per device.

use chrono::{Local, NaiveDate};
use mdmsync_reconcile::{JobReport, ReportError, ReportOutcome, ReportSink};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Date stamp used in report file names, e.g. `Mar-31-2024`.
pub const DATE_FORMAT: &str = "%b-%d-%Y";

/// Writes job reports as CSV files.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    results_dir: PathBuf,
    date: NaiveDate,
}

impl CsvReportSink {
    /// Sink stamped with today's local date.
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self::for_date(results_dir, Local::now().date_naive())
    }

    pub fn for_date(results_dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            results_dir: results_dir.into(),
            date,
        }
    }

    /// Where a report with this stem would be written.
    pub fn path_for(&self, file_stem: &str) -> PathBuf {
        self.results_dir.join(format!(
            "{}_{}.csv",
            file_stem,
            self.date.format(DATE_FORMAT)
        ))
    }
}

/// Write the header and rows of a report.
pub fn write_report_csv<W: Write>(report: &JobReport, writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&report.columns).map_err(encode_error)?;
    for row in &report.rows {
        wtr.write_record(row).map_err(encode_error)?;
    }

    wtr.flush().map_err(|e| ReportError::Encode {
        message: e.to_string(),
    })?;
    Ok(())
}

fn encode_error(e: csv::Error) -> ReportError {
    ReportError::Encode {
        message: e.to_string(),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ReportSink for CsvReportSink {
    fn write(&self, report: &JobReport) -> Result<ReportOutcome, ReportError> {
        if report.is_empty() {
            tracing::info!(job = %report.job, "No rows to report, skipping file");
            return Ok(ReportOutcome::Skipped);
        }

        std::fs::create_dir_all(&self.results_dir)
            .map_err(|e| io_error(&self.results_dir, e))?;

        let path = self.path_for(&report.file_stem);
        let file = std::fs::File::create(&path).map_err(|e| io_error(&path, e))?;
        write_report_csv(report, file)?;

        tracing::info!(
            job = %report.job,
            path = %path.display(),
            rows = report.len(),
            "Report written"
        );
        Ok(ReportOutcome::Written {
            path,
            rows: report.len(),
        })
    }
}

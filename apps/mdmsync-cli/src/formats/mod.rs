//! Report output formats

pub mod csv;

pub use self::csv::CsvReportSink;

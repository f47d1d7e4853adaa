//! Report output
//!
//! Routes reconciled rows and aggregate statistics to either a CSV table
//! or a JSONL stream, chosen by configuration.

pub mod csv_writer;
pub mod jsonl_writer;

pub use csv_writer::{CsvReportWriter, CSV_HEADER};
pub use jsonl_writer::JsonlReportWriter;

use {
    crate::reconcile::{AggregateStats, ReconciledRow},
    std::{fmt, fs::File, path::Path},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Jsonl,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "jsonl" | "json" => Some(ReportFormat::Jsonl),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err)
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "IO error: {}", e),
            ReportError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

pub trait ReportBackend {
    /// Write all rows, then the statistics sections when present
    fn write_report(
        &mut self,
        rows: &[ReconciledRow],
        stats: Option<&AggregateStats>,
    ) -> Result<(), ReportError>;

    fn backend_type(&self) -> &'static str;
}

/// Report writer for the configured format
pub enum ReportWriter {
    Csv(CsvReportWriter<File>),
    Jsonl(JsonlReportWriter<File>),
}

impl ReportWriter {
    pub fn create(format: ReportFormat, path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;

        Ok(match format {
            ReportFormat::Csv => ReportWriter::Csv(CsvReportWriter::new(file)),
            ReportFormat::Jsonl => ReportWriter::Jsonl(JsonlReportWriter::new(file)),
        })
    }
}

impl ReportBackend for ReportWriter {
    fn write_report(
        &mut self,
        rows: &[ReconciledRow],
        stats: Option<&AggregateStats>,
    ) -> Result<(), ReportError> {
        match self {
            ReportWriter::Csv(w) => w.write_report(rows, stats),
            ReportWriter::Jsonl(w) => w.write_report(rows, stats),
        }
    }

    fn backend_type(&self) -> &'static str {
        match self {
            ReportWriter::Csv(w) => w.backend_type(),
            ReportWriter::Jsonl(w) => w.backend_type(),
        }
    }
}

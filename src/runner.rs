//! End-to-end reconciliation run: inputs → rows → report

use {
    crate::{
        config::ReconcileConfig,
        fetcher::{FetchBackend, FetchError, IndexerFetcher, Pacer, RpcFetcher, TransactionFetcher},
        reconcile::{AggregateStats, Reconciler},
        report::{ReportBackend, ReportError, ReportFormat, ReportWriter},
        telemetry::{load_signatures, parse_log_reader},
    },
    std::{
        fmt,
        fs::File,
        io::BufReader,
        path::{Path, PathBuf},
        time::Duration,
    },
};

#[derive(Debug)]
pub enum ReconcileError {
    /// An input file does not exist; nothing was processed
    RequiredFileMissing(PathBuf),
    /// The signature list parsed to zero entries
    NothingToReconcile(PathBuf),
    Io(std::io::Error),
    Fetcher(FetchError),
    Report(ReportError),
}

impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        ReconcileError::Io(err)
    }
}

impl From<FetchError> for ReconcileError {
    fn from(err: FetchError) -> Self {
        ReconcileError::Fetcher(err)
    }
}

impl From<ReportError> for ReconcileError {
    fn from(err: ReportError) -> Self {
        ReconcileError::Report(err)
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::RequiredFileMissing(path) => {
                write!(f, "Required file not found: {}", path.display())
            }
            ReconcileError::NothingToReconcile(path) => {
                write!(f, "No signatures to reconcile in {}", path.display())
            }
            ReconcileError::Io(e) => write!(f, "IO error: {}", e),
            ReconcileError::Fetcher(e) => write!(f, "Fetcher setup failed: {}", e),
            ReconcileError::Report(e) => write!(f, "Report error: {}", e),
        }
    }
}

impl std::error::Error for ReconcileError {}

/// Paths and knobs for one run, independent of where they were configured
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub log_path: PathBuf,
    pub signatures_path: PathBuf,
    pub output_path: PathBuf,
    pub report_format: ReportFormat,
    pub fetch_delay: Duration,
}

impl From<&ReconcileConfig> for RunOptions {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            log_path: config.log_path.clone(),
            signatures_path: config.signatures_path.clone(),
            output_path: config.output_path.clone(),
            report_format: config.report_format,
            fetch_delay: Duration::from_millis(config.fetch_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub found: usize,
    pub output_path: PathBuf,
}

/// Construct the configured fetch backend
pub fn build_fetcher(config: &ReconcileConfig) -> Result<Box<dyn TransactionFetcher>, ReconcileError> {
    let fetcher: Box<dyn TransactionFetcher> = match config.backend {
        FetchBackend::LedgerRpc => Box::new(RpcFetcher::new(
            config.rpc_url.clone(),
            config.commitment,
            config.request_timeout,
        )?),
        FetchBackend::Indexer => Box::new(IndexerFetcher::new(
            config.indexer_url.clone(),
            config.indexer_api_key.clone().unwrap_or_default(),
            config.request_timeout,
        )?),
    };
    Ok(fetcher)
}

fn require_file(path: &Path) -> Result<(), ReconcileError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReconcileError::RequiredFileMissing(path.to_path_buf()))
    }
}

/// Run the whole reconciliation and write the report.
///
/// Both input files are checked before anything is read, so a missing
/// input never produces an output file.
pub async fn run(
    options: &RunOptions,
    fetcher: &dyn TransactionFetcher,
) -> Result<RunSummary, ReconcileError> {
    require_file(&options.log_path)?;
    require_file(&options.signatures_path)?;

    let telemetry = parse_log_reader(BufReader::new(File::open(&options.log_path)?))?;
    log::info!(
        "📋 Parsed telemetry for {} signatures from {}",
        telemetry.len(),
        options.log_path.display()
    );

    let signatures = load_signatures(&options.signatures_path)?;
    if signatures.is_empty() {
        return Err(ReconcileError::NothingToReconcile(options.signatures_path.clone()));
    }

    let mut reconciler = Reconciler::new(fetcher, Pacer::new(options.fetch_delay));
    let rows = reconciler.run(&signatures, &telemetry).await;
    let stats = AggregateStats::from_rows(&rows);

    let mut writer = ReportWriter::create(options.report_format, &options.output_path)?;
    writer.write_report(&rows, stats.as_ref())?;
    log::info!(
        "💾 Wrote {} report to {}",
        writer.backend_type(),
        options.output_path.display()
    );

    Ok(RunSummary {
        total: rows.len(),
        found: rows.iter().filter(|r| r.found).count(),
        output_path: options.output_path.clone(),
    })
}

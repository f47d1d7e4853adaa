use {
    crate::{
        fetcher::{Commitment, FetchBackend},
        report::ReportFormat,
    },
    std::{env, path::PathBuf, time::Duration},
};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_INDEXER_URL: &str = "https://api.helius.xyz/v0/transactions";

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime configuration for a reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub backend: FetchBackend,
    pub rpc_url: String,
    pub indexer_url: String,
    pub indexer_api_key: Option<String>,
    pub commitment: Commitment,
    pub log_path: PathBuf,
    pub signatures_path: PathBuf,
    pub output_path: PathBuf,
    pub report_format: ReportFormat,
    pub fetch_delay_ms: u64,
    pub request_timeout: Duration,
    pub rust_log: String,
}

/// Value following `--flag` on the command line
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

impl ReconcileConfig {
    /// Load from environment variables, with command-line flags taking precedence
    ///
    /// Environment variables:
    /// - `FETCH_BACKEND` (rpc | indexer, default: rpc)
    /// - `RPC_URL` (default: mainnet-beta public endpoint)
    /// - `INDEXER_URL`, `INDEXER_API_KEY` (key required for the indexer backend)
    /// - `COMMITMENT_LEVEL` (default: confirmed)
    /// - `LOG_FILE` (default: bot.log)
    /// - `SIGNATURES_FILE` (default: signatures.json)
    /// - `OUTPUT_PATH` (default: transaction_report.csv)
    /// - `REPORT_FORMAT` (csv | jsonl, default: csv)
    /// - `FETCH_DELAY_MS` (default: 50)
    /// - `REQUEST_TIMEOUT_SECS` (default: 30)
    ///
    /// Flags: `--backend`, `--log`, `--signatures`, `--output`, `--format`
    pub fn from_env_and_args(args: &[String]) -> Result<Self, ConfigError> {
        let backend_str = arg_value(args, "--backend").unwrap_or_else(|| env_or("FETCH_BACKEND", "rpc"));
        let backend = FetchBackend::parse(&backend_str).ok_or_else(|| {
            ConfigError::InvalidValue(format!("unknown fetch backend '{}'", backend_str))
        })?;

        let rpc_url = env_or("RPC_URL", DEFAULT_RPC_URL);
        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "RPC_URL must start with http:// or https://".to_string(),
            ));
        }

        let indexer_url = env_or("INDEXER_URL", DEFAULT_INDEXER_URL);
        let indexer_api_key = env::var("INDEXER_API_KEY").ok().filter(|k| !k.is_empty());
        if backend == FetchBackend::Indexer && indexer_api_key.is_none() {
            return Err(ConfigError::MissingVariable("INDEXER_API_KEY".to_string()));
        }

        let commitment_str = env_or("COMMITMENT_LEVEL", "confirmed");
        let commitment = Commitment::parse(&commitment_str).unwrap_or_else(|| {
            log::warn!(
                "Invalid COMMITMENT_LEVEL '{}', defaulting to confirmed",
                commitment_str
            );
            Commitment::Confirmed
        });

        let format_str = arg_value(args, "--format").unwrap_or_else(|| env_or("REPORT_FORMAT", "csv"));
        let report_format = ReportFormat::parse(&format_str).ok_or_else(|| {
            ConfigError::InvalidValue(format!("unknown report format '{}'", format_str))
        })?;

        let fetch_delay_ms = env::var("FETCH_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50);

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            backend,
            rpc_url,
            indexer_url,
            indexer_api_key,
            commitment,
            log_path: arg_value(args, "--log")
                .unwrap_or_else(|| env_or("LOG_FILE", "bot.log"))
                .into(),
            signatures_path: arg_value(args, "--signatures")
                .unwrap_or_else(|| env_or("SIGNATURES_FILE", "signatures.json"))
                .into(),
            output_path: arg_value(args, "--output")
                .unwrap_or_else(|| env_or("OUTPUT_PATH", "transaction_report.csv"))
                .into(),
            report_format,
            fetch_delay_ms,
            request_timeout: Duration::from_secs(request_timeout_secs),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        Self::from_env_and_args(&args)
    }
}

//! Reconcile - Bot Telemetry vs On-Chain Outcome Report
//!
//! Joins the bot's execution log with on-chain transaction data for a list
//! of signatures and writes a per-transaction profit report plus grouped
//! statistics.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin reconcile -- --log bot.log --signatures signatures.json
//! cargo run --release --bin reconcile -- --backend indexer --format jsonl --output report.jsonl
//! ```
//!
//! ## Environment Variables
//!
//! - FETCH_BACKEND - `rpc` or `indexer` (default: rpc)
//! - RPC_URL - Ledger node endpoint (default: https://api.mainnet-beta.solana.com)
//! - INDEXER_URL / INDEXER_API_KEY - Indexer endpoint and key (key required for indexer)
//! - COMMITMENT_LEVEL - processed | confirmed | finalized (default: confirmed)
//! - LOG_FILE / SIGNATURES_FILE / OUTPUT_PATH - Input and output paths
//! - REPORT_FORMAT - csv | jsonl (default: csv)
//! - FETCH_DELAY_MS - Pause between upstream requests (default: 50)
//! - RUST_LOG - Logging level (optional, default: info)

use solrecon::{
    config::ReconcileConfig,
    runner::{self, build_fetcher, RunOptions},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match ReconcileConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            return Err(e.into());
        }
    };

    log::info!("🚀 Starting reconciliation...");
    log::info!("📊 Configuration:");
    log::info!("   Backend: {}", config.backend);
    match config.backend {
        solrecon::FetchBackend::LedgerRpc => {
            log::info!("   RPC_URL: {} ({})", config.rpc_url, config.commitment.as_str())
        }
        solrecon::FetchBackend::Indexer => log::info!("   INDEXER_URL: {}", config.indexer_url),
    }
    log::info!("   Log file: {}", config.log_path.display());
    log::info!("   Signatures: {}", config.signatures_path.display());
    log::info!("   Output: {} ({:?})", config.output_path.display(), config.report_format);
    log::info!("   Fetch delay: {}ms", config.fetch_delay_ms);
    log::info!("   RUST_LOG: {}", config.rust_log);

    let fetcher = build_fetcher(&config)?;
    let options = RunOptions::from(&config);

    match runner::run(&options, fetcher.as_ref()).await {
        Ok(summary) => {
            log::info!(
                "✅ Done: {}/{} transactions found, report at {}",
                summary.found,
                summary.total,
                summary.output_path.display()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Reconciliation failed: {}", e);
            Err(e.into())
        }
    }
}

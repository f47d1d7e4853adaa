//! solrecon - reconciles trading bot telemetry with on-chain transactions
//!
//! # Architecture
//!
//! ```text
//! bot.log ──→ LogParser ──────────────→ TelemetryMap ─┐
//!                                                     ├──→ Reconciler ──→ AggregateStats ──→ ReportWriter
//! signatures ──→ SignatureLoader ──→ TransactionFetcher ──→ normalize ──→ FinancialMetrics
//! ```

pub mod config;
pub mod fetcher;
pub mod metrics;
pub mod normalizer;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod telemetry;

pub use config::{ConfigError, ReconcileConfig};
pub use fetcher::{fetch_or_none, FetchBackend, RawTransactionPayload, TransactionFetcher};
pub use metrics::{FinancialMetrics, TipPercentagePolicy, WsolFlows};
pub use normalizer::{normalize, CanonicalTransactionRecord, NormalizeError};
pub use reconcile::{AggregateStats, ReconciledRow, Reconciler};
pub use runner::{run, ReconcileError, RunOptions, RunSummary};

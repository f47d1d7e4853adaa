//! Reconciliation of bot telemetry with on-chain transaction data
//!
//! ```text
//! signatures ──→ fetch_or_none ──→ normalize ──→ FinancialMetrics ─┐
//!      │                                                           ├──→ ReconciledRow
//!      └────────→ TelemetryMap lookup ─────────────────────────────┘
//! ```
//!
//! One row is produced per input signature, in input order. Signatures are
//! processed strictly one after another with a fixed pause between them.

pub mod stats;

pub use stats::{AggregateStats, StatsAccumulator};

use {
    crate::{
        fetcher::{fetch_or_none, Pacer, TransactionFetcher},
        metrics::FinancialMetrics,
        normalizer::{normalize, CanonicalTransactionRecord},
        telemetry::{TelemetryEntry, TelemetryMap},
    },
    serde::Serialize,
};

/// Type/region label used when the log has no entry for a signature
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRow {
    pub signature: String,
    pub tx_type: String,
    pub region: String,
    pub time_spent_ms: Option<f64>,
    pub quote_time_ms: Option<f64>,
    pub found: bool,
    pub record: Option<CanonicalTransactionRecord>,
    pub metrics: Option<FinancialMetrics>,
}

impl ReconciledRow {
    /// Join one signature with its telemetry and (optionally) its fetched record
    pub fn build(
        signature: &str,
        telemetry: Option<&TelemetryEntry>,
        record: Option<CanonicalTransactionRecord>,
    ) -> Self {
        let (tx_type, region, time_spent_ms, quote_time_ms) = match telemetry {
            Some(entry) => (
                entry.tx_type.as_str().to_string(),
                entry.region.clone(),
                entry.time_spent_ms,
                entry.quote_time_ms,
            ),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string(), None, None),
        };

        let metrics = record.as_ref().map(FinancialMetrics::from_record);

        Self {
            signature: signature.to_string(),
            tx_type,
            region,
            time_spent_ms,
            quote_time_ms,
            found: record.is_some(),
            record,
            metrics,
        }
    }
}

/// Fetch and normalize one signature; every failure collapses to `None`
pub async fn fetch_record(
    fetcher: &dyn TransactionFetcher,
    signature: &str,
) -> Option<CanonicalTransactionRecord> {
    let payload = fetch_or_none(fetcher, signature).await?;

    match normalize(&payload, signature) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("⚠️  Could not normalize {}: {}", signature, e);
            None
        }
    }
}

pub struct Reconciler<'a> {
    fetcher: &'a dyn TransactionFetcher,
    pacer: Pacer,
}

impl<'a> Reconciler<'a> {
    pub fn new(fetcher: &'a dyn TransactionFetcher, pacer: Pacer) -> Self {
        Self { fetcher, pacer }
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Produce exactly one row per signature, in order
    pub async fn run(&mut self, signatures: &[String], telemetry: &TelemetryMap) -> Vec<ReconciledRow> {
        let total = signatures.len();
        let mut rows = Vec::with_capacity(total);

        for (idx, signature) in signatures.iter().enumerate() {
            log::info!("🔎 [{}/{}] {}", idx + 1, total, signature);

            let record = fetch_record(self.fetcher, signature).await;
            let row = ReconciledRow::build(signature, telemetry.get(signature), record);

            if let Some(metrics) = &row.metrics {
                log::debug!(
                    "✅ {} in={:.9} out={:.9} tip={:.9} profit={:.9}",
                    signature,
                    metrics.total_wsol_in,
                    metrics.total_wsol_out,
                    metrics.tip,
                    metrics.profit
                );
            }

            rows.push(row);
            self.pacer.pace().await;
        }

        let found = rows.iter().filter(|r| r.found).count();
        log::info!("📊 Reconciled {} signatures: {} found, {} missing", total, found, total - found);

        rows
    }
}

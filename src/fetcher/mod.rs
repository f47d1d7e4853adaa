//! Upstream transaction retrieval
//!
//! Two interchangeable backends return the raw transaction payload for a
//! signature:
//!
//! - [`RpcFetcher`]: `getTransaction` against a ledger node (jsonParsed encoding)
//! - [`IndexerFetcher`]: enhanced-transactions indexer API (batch endpoint,
//!   called with one signature at a time)
//!
//! Callers go through [`fetch_or_none`], which applies the report-artifact
//! filter and maps every transport or decoding failure to "not found".

pub mod artifact_filter;
pub mod indexer_client;
pub mod pacer;
pub mod rpc_client;

pub use artifact_filter::is_report_artifact;
pub use indexer_client::IndexerFetcher;
pub use pacer::Pacer;
pub use rpc_client::{Commitment, RpcFetcher};

use async_trait::async_trait;
use std::fmt;

/// Which upstream service produced a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchBackend {
    LedgerRpc,
    Indexer,
}

impl FetchBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rpc" | "ledger" | "ledger_rpc" => Some(FetchBackend::LedgerRpc),
            "indexer" | "helius" => Some(FetchBackend::Indexer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchBackend::LedgerRpc => "rpc",
            FetchBackend::Indexer => "indexer",
        }
    }
}

impl fmt::Display for FetchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw upstream record, tagged by the shape it arrived in.
///
/// Only the normalizer looks inside.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTransactionPayload {
    LedgerRpc(serde_json::Value),
    Indexer(serde_json::Value),
}

impl RawTransactionPayload {
    pub fn backend(&self) -> FetchBackend {
        match self {
            RawTransactionPayload::LedgerRpc(_) => FetchBackend::LedgerRpc,
            RawTransactionPayload::Indexer(_) => FetchBackend::Indexer,
        }
    }
}

#[derive(Debug)]
pub enum FetchError {
    Transport(reqwest::Error),
    Status(u16),
    Rpc(String),
    Decode(serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "Transport error: {}", e),
            FetchError::Status(code) => write!(f, "Upstream returned HTTP {}", code),
            FetchError::Rpc(msg) => write!(f, "RPC error: {}", msg),
            FetchError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

#[async_trait]
pub trait TransactionFetcher: Send + Sync {
    /// Fetch one transaction; `Ok(None)` when the upstream has no record of it
    async fn fetch(&self, signature: &str) -> Result<Option<RawTransactionPayload>, FetchError>;

    /// Backend tag for logging and metric policy selection
    fn backend(&self) -> FetchBackend;
}

/// Fetch with artifact filtering and failure isolation.
///
/// Never returns an error: rejected tokens, upstream misses and transport
/// failures all come back as `None`.
pub async fn fetch_or_none(
    fetcher: &dyn TransactionFetcher,
    signature: &str,
) -> Option<RawTransactionPayload> {
    if is_report_artifact(signature) {
        log::debug!("Skipping non-signature token {:?}", signature);
        return None;
    }

    match fetcher.fetch(signature).await {
        Ok(Some(payload)) => Some(payload),
        Ok(None) => {
            log::warn!("⚠️  Transaction not found: {}", signature);
            None
        }
        Err(e) => {
            log::warn!("⚠️  Failed to fetch {} via {}: {}", signature, fetcher.backend(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TransactionFetcher for CountingFetcher {
        async fn fetch(&self, _signature: &str) -> Result<Option<RawTransactionPayload>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(FetchError::Status(429))
            } else {
                Ok(Some(RawTransactionPayload::Indexer(serde_json::json!({}))))
            }
        }

        fn backend(&self) -> FetchBackend {
            FetchBackend::Indexer
        }
    }

    #[tokio::test]
    async fn test_artifact_skips_network_call() {
        let fetcher = CountingFetcher { calls: AtomicUsize::new(0), fail: false };
        assert!(fetch_or_none(&fetcher, "Statistics").await.is_none());
        assert!(fetch_or_none(&fetcher, "").await.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_none() {
        let fetcher = CountingFetcher { calls: AtomicUsize::new(0), fail: true };
        assert!(fetch_or_none(&fetcher, "SIG1").await.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_passes_payload_through() {
        let fetcher = CountingFetcher { calls: AtomicUsize::new(0), fail: false };
        let payload = fetch_or_none(&fetcher, "SIG1").await.unwrap();
        assert_eq!(payload.backend(), FetchBackend::Indexer);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(FetchBackend::parse("RPC"), Some(FetchBackend::LedgerRpc));
        assert_eq!(FetchBackend::parse("indexer"), Some(FetchBackend::Indexer));
        assert_eq!(FetchBackend::parse("sqlite"), None);
    }
}

//! Transaction normalization
//!
//! Reduces either upstream payload shape to one [`CanonicalTransactionRecord`].
//!
//! ```text
//! RawTransactionPayload::LedgerRpc ──→ ledger_rpc::normalize ──┐
//!                                                              ├──→ CanonicalTransactionRecord
//! RawTransactionPayload::Indexer ────→ indexer::normalize ─────┘
//! ```

pub mod indexer;
pub mod ledger_rpc;
pub mod memo;

pub use memo::{Memo, MEMO_PROGRAM_ID};

use {
    crate::fetcher::{FetchBackend, RawTransactionPayload},
    serde::Serialize,
    std::fmt,
};

/// Wrapped SOL mint
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Signed change of one token balance, in UI units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalanceDelta {
    pub mint: String,
    pub owner: Option<String>,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeTransfer {
    pub from: String,
    pub to: String,
    pub amount_lamports: u64,
}

/// Backend-independent view of a fetched transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalTransactionRecord {
    pub hash: String,
    pub backend: FetchBackend,
    pub slot: Option<u64>,
    /// Unix seconds
    pub block_timestamp: Option<i64>,
    pub fee_payer: String,
    pub token_balance_deltas: Vec<TokenBalanceDelta>,
    pub native_transfers: Vec<NativeTransfer>,
    /// Tip paid by the fee payer, as extracted by the backend-specific rule
    pub tip_lamports: u64,
    pub memo_text: Option<String>,
    pub memo_raw: Option<String>,
}

impl CanonicalTransactionRecord {
    pub fn block_time_rfc3339(&self) -> Option<String> {
        self.block_timestamp
            .and_then(|ts| chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339())
    }
}

#[derive(Debug)]
pub enum NormalizeError {
    /// A field required to build the canonical record is absent
    MalformedPayload(String),
}

impl From<serde_json::Error> for NormalizeError {
    fn from(err: serde_json::Error) -> Self {
        NormalizeError::MalformedPayload(err.to_string())
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::MalformedPayload(msg) => write!(f, "Malformed payload: {}", msg),
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Normalize a raw payload; `signature` is used when the payload omits its own
pub fn normalize(
    payload: &RawTransactionPayload,
    signature: &str,
) -> Result<CanonicalTransactionRecord, NormalizeError> {
    match payload {
        RawTransactionPayload::LedgerRpc(value) => ledger_rpc::normalize(value, signature),
        RawTransactionPayload::Indexer(value) => indexer::normalize(value, signature),
    }
}

//! Enhanced-transactions indexer normalization

use {
    super::{
        CanonicalTransactionRecord, Memo, NativeTransfer, NormalizeError, TokenBalanceDelta,
        MEMO_PROGRAM_ID,
    },
    crate::fetcher::FetchBackend,
    serde::Deserialize,
    serde_json::Value,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexerTransaction {
    signature: Option<String>,
    slot: Option<u64>,
    timestamp: Option<i64>,
    fee_payer: String,
    #[serde(default)]
    token_transfers: Option<Vec<IndexerTokenTransfer>>,
    #[serde(default)]
    native_transfers: Option<Vec<IndexerNativeTransfer>>,
    #[serde(default)]
    instructions: Option<Vec<IndexerInstruction>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexerTokenTransfer {
    from_user_account: Option<String>,
    to_user_account: Option<String>,
    mint: String,
    token_amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexerNativeTransfer {
    from_user_account: Option<String>,
    to_user_account: Option<String>,
    amount: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexerInstruction {
    program_id: String,
    data: Option<String>,
}

/// Token transfers touching the fee payer, as signed deltas.
///
/// A transfer into the fee payer is a positive delta, one out of it is
/// negative. A self-transfer yields both.
fn fee_payer_deltas(transfers: &[IndexerTokenTransfer], fee_payer: &str) -> Vec<TokenBalanceDelta> {
    let mut deltas = Vec::new();

    for transfer in transfers {
        if transfer.to_user_account.as_deref() == Some(fee_payer) {
            deltas.push(TokenBalanceDelta {
                mint: transfer.mint.clone(),
                owner: Some(fee_payer.to_string()),
                delta: transfer.token_amount,
            });
        }
        if transfer.from_user_account.as_deref() == Some(fee_payer) {
            deltas.push(TokenBalanceDelta {
                mint: transfer.mint.clone(),
                owner: Some(fee_payer.to_string()),
                delta: -transfer.token_amount,
            });
        }
    }

    deltas
}

pub fn normalize(value: &Value, signature: &str) -> Result<CanonicalTransactionRecord, NormalizeError> {
    let tx = IndexerTransaction::deserialize(value)?;

    if tx.fee_payer.is_empty() {
        return Err(NormalizeError::MalformedPayload("empty feePayer".to_string()));
    }

    let token_transfers = tx.token_transfers.unwrap_or_default();
    let native = tx.native_transfers.unwrap_or_default();
    let instructions = tx.instructions.unwrap_or_default();

    let tip_lamports: u64 = native
        .iter()
        .filter(|t| t.from_user_account.as_deref() == Some(tx.fee_payer.as_str()))
        .map(|t| t.amount)
        .sum();

    let memo = instructions
        .iter()
        .find(|ix| ix.program_id == MEMO_PROGRAM_ID)
        .and_then(|ix| ix.data.as_deref())
        .map(Memo::from_encoded)
        .unwrap_or_default();

    let native_transfers = native
        .into_iter()
        .map(|t| NativeTransfer {
            from: t.from_user_account.unwrap_or_default(),
            to: t.to_user_account.unwrap_or_default(),
            amount_lamports: t.amount,
        })
        .collect();

    Ok(CanonicalTransactionRecord {
        hash: tx.signature.unwrap_or_else(|| signature.to_string()),
        backend: FetchBackend::Indexer,
        slot: tx.slot,
        block_timestamp: tx.timestamp,
        token_balance_deltas: fee_payer_deltas(&token_transfers, &tx.fee_payer),
        fee_payer: tx.fee_payer,
        native_transfers,
        tip_lamports,
        memo_text: memo.text,
        memo_raw: memo.raw,
    })
}

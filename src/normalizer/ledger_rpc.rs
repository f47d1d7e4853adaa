//! Ledger node `getTransaction` (jsonParsed) normalization

use {
    super::{
        CanonicalTransactionRecord, Memo, NormalizeError, TokenBalanceDelta, MEMO_PROGRAM_ID,
    },
    crate::fetcher::FetchBackend,
    serde::Deserialize,
    serde_json::Value,
    solana_account_decoder_client_types::token::UiTokenAmount,
    std::collections::BTreeMap,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerTransaction {
    slot: Option<u64>,
    block_time: Option<i64>,
    transaction: LedgerTransactionBody,
    meta: Option<LedgerMeta>,
}

#[derive(Debug, Deserialize)]
struct LedgerTransactionBody {
    #[serde(default)]
    signatures: Vec<String>,
    message: LedgerMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerMessage {
    account_keys: Vec<AccountKey>,
    #[serde(default)]
    instructions: Vec<LedgerInstruction>,
}

/// jsonParsed returns objects, json/binary encodings return bare strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountKey {
    Parsed { pubkey: String },
    Plain(String),
}

impl AccountKey {
    fn pubkey(&self) -> &str {
        match self {
            AccountKey::Parsed { pubkey } => pubkey,
            AccountKey::Plain(pubkey) => pubkey,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerInstruction {
    program_id: Option<String>,
    data: Option<String>,
    parsed: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerMeta {
    pre_balances: Vec<u64>,
    post_balances: Vec<u64>,
    #[serde(default)]
    pre_token_balances: Option<Vec<LedgerTokenBalance>>,
    #[serde(default)]
    post_token_balances: Option<Vec<LedgerTokenBalance>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerTokenBalance {
    account_index: usize,
    mint: String,
    owner: Option<String>,
    ui_token_amount: UiTokenAmount,
}

/// Raw integer amount scaled by decimals
fn token_amount_ui(amount: &UiTokenAmount) -> Result<f64, NormalizeError> {
    let raw = amount.amount.parse::<u64>().map_err(|e| {
        NormalizeError::MalformedPayload(format!("token amount {:?}: {}", amount.amount, e))
    })?;
    Ok(raw as f64 / 10f64.powi(amount.decimals as i32))
}

/// Pair pre/post token balances by account index and compute post − pre.
///
/// A balance present on only one side counts as zero on the other
/// (account opened or closed within the transaction).
fn token_deltas(
    pre: &[LedgerTokenBalance],
    post: &[LedgerTokenBalance],
) -> Result<Vec<TokenBalanceDelta>, NormalizeError> {
    let mut paired: BTreeMap<usize, (Option<&LedgerTokenBalance>, Option<&LedgerTokenBalance>)> =
        BTreeMap::new();

    for balance in pre {
        paired.entry(balance.account_index).or_default().0 = Some(balance);
    }
    for balance in post {
        paired.entry(balance.account_index).or_default().1 = Some(balance);
    }

    let mut deltas = Vec::new();

    for (pre, post) in paired.into_values() {
        let Some(reference) = post.or(pre) else {
            continue;
        };
        let pre_amount = match pre {
            Some(b) => token_amount_ui(&b.ui_token_amount)?,
            None => 0.0,
        };
        let post_amount = match post {
            Some(b) => token_amount_ui(&b.ui_token_amount)?,
            None => 0.0,
        };
        let delta = post_amount - pre_amount;

        if delta == 0.0 {
            continue;
        }

        let owner = post
            .and_then(|b| b.owner.clone())
            .or_else(|| pre.and_then(|b| b.owner.clone()));

        deltas.push(TokenBalanceDelta {
            mint: reference.mint.clone(),
            owner,
            delta,
        });
    }

    Ok(deltas)
}

fn extract_memo(instructions: &[LedgerInstruction]) -> Memo {
    let Some(instruction) = instructions
        .iter()
        .find(|ix| ix.program_id.as_deref() == Some(MEMO_PROGRAM_ID))
    else {
        return Memo::default();
    };

    match (&instruction.data, &instruction.parsed) {
        (Some(data), _) => Memo::from_encoded(data),
        (None, Some(Value::String(text))) => Memo::from_parsed(text),
        _ => Memo::default(),
    }
}

pub fn normalize(value: &Value, signature: &str) -> Result<CanonicalTransactionRecord, NormalizeError> {
    let tx = LedgerTransaction::deserialize(value)?;

    let meta = tx
        .meta
        .ok_or_else(|| NormalizeError::MalformedPayload("missing meta".to_string()))?;

    let fee_payer = tx
        .transaction
        .message
        .account_keys
        .first()
        .map(|key| key.pubkey().to_string())
        .ok_or_else(|| NormalizeError::MalformedPayload("empty account key list".to_string()))?;

    let (pre_native, post_native) = match (meta.pre_balances.first(), meta.post_balances.first()) {
        (Some(pre), Some(post)) => (*pre, *post),
        _ => {
            return Err(NormalizeError::MalformedPayload(
                "missing fee payer native balances".to_string(),
            ))
        }
    };

    let pre_tokens = meta.pre_token_balances.unwrap_or_default();
    let post_tokens = meta.post_token_balances.unwrap_or_default();
    let memo = extract_memo(&tx.transaction.message.instructions);

    let hash = tx
        .transaction
        .signatures
        .first()
        .cloned()
        .unwrap_or_else(|| signature.to_string());

    Ok(CanonicalTransactionRecord {
        hash,
        backend: FetchBackend::LedgerRpc,
        slot: tx.slot,
        block_timestamp: tx.block_time,
        fee_payer,
        token_balance_deltas: token_deltas(&pre_tokens, &post_tokens)?,
        native_transfers: Vec::new(),
        tip_lamports: pre_native.abs_diff(post_native),
        memo_text: memo.text,
        memo_raw: memo.raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::WSOL_MINT;
    use serde_json::json;

    const BOT: &str = "BotWa11et1111111111111111111111111111111111";

    fn token_balance(index: usize, mint: &str, owner: &str, amount: u64) -> Value {
        json!({
            "accountIndex": index,
            "mint": mint,
            "owner": owner,
            "programId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            "uiTokenAmount": {
                "amount": amount.to_string(),
                "decimals": 9,
                "uiAmount": amount as f64 / 1e9,
                "uiAmountString": (amount as f64 / 1e9).to_string()
            }
        })
    }

    fn sample_payload() -> Value {
        json!({
            "slot": 312_000_000u64,
            "blockTime": 1_735_000_000i64,
            "transaction": {
                "signatures": ["SIGLEDGER"],
                "message": {
                    "accountKeys": [
                        {"pubkey": BOT, "signer": true, "writable": true, "source": "transaction"},
                        {"pubkey": "Pool111", "signer": false, "writable": true, "source": "transaction"}
                    ],
                    "instructions": [
                        {"programId": "ComputeBudget111111111111111111111111111111", "data": "3DdGGhkhJbjm", "accounts": []},
                        {"programId": MEMO_PROGRAM_ID, "data": bs58::encode("route-7").into_string(), "accounts": []}
                    ]
                }
            },
            "meta": {
                "err": null,
                "fee": 5000,
                "preBalances": [1_000_000_000u64, 50],
                "postBalances": [990_000_000u64, 50],
                "preTokenBalances": [
                    token_balance(2, WSOL_MINT, BOT, 2_000_000_000),
                    token_balance(3, WSOL_MINT, "Pool111", 9_000_000_000)
                ],
                "postTokenBalances": [
                    token_balance(2, WSOL_MINT, BOT, 2_800_000_000),
                    token_balance(3, WSOL_MINT, "Pool111", 8_200_000_000)
                ]
            }
        })
    }

    #[test]
    fn test_normalize_ledger_payload() {
        let record = normalize(&sample_payload(), "SIGLEDGER").unwrap();

        assert_eq!(record.hash, "SIGLEDGER");
        assert_eq!(record.backend, FetchBackend::LedgerRpc);
        assert_eq!(record.fee_payer, BOT);
        assert_eq!(record.slot, Some(312_000_000));
        assert_eq!(record.block_timestamp, Some(1_735_000_000));
        assert_eq!(record.tip_lamports, 10_000_000);
        assert_eq!(record.memo_text.as_deref(), Some("route-7"));
        assert!(record.memo_raw.is_some());

        assert_eq!(record.token_balance_deltas.len(), 2);
        let bot_delta = record
            .token_balance_deltas
            .iter()
            .find(|d| d.owner.as_deref() == Some(BOT))
            .unwrap();
        assert!((bot_delta.delta - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_plain_string_account_keys() {
        let mut payload = sample_payload();
        payload["transaction"]["message"]["accountKeys"] = json!([BOT, "Pool111"]);
        let record = normalize(&payload, "SIGLEDGER").unwrap();
        assert_eq!(record.fee_payer, BOT);
    }

    #[test]
    fn test_account_opened_and_closed() {
        let pre = vec![LedgerTokenBalance {
            account_index: 4,
            mint: WSOL_MINT.to_string(),
            owner: Some(BOT.to_string()),
            ui_token_amount: UiTokenAmount {
                ui_amount: Some(1.5),
                decimals: 9,
                amount: "1500000000".to_string(),
                ui_amount_string: "1.5".to_string(),
            },
        }];
        let post = vec![LedgerTokenBalance {
            account_index: 5,
            mint: WSOL_MINT.to_string(),
            owner: Some(BOT.to_string()),
            ui_token_amount: UiTokenAmount {
                ui_amount: Some(0.25),
                decimals: 9,
                amount: "250000000".to_string(),
                ui_amount_string: "0.25".to_string(),
            },
        }];

        let deltas = token_deltas(&pre, &post).unwrap();
        assert_eq!(deltas.len(), 2);
        assert!((deltas[0].delta + 1.5).abs() < 1e-12);
        assert!((deltas[1].delta - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_parsed_memo_is_used_directly() {
        let mut payload = sample_payload();
        payload["transaction"]["message"]["instructions"] = json!([
            {"program": "spl-memo", "programId": MEMO_PROGRAM_ID, "parsed": "hello bundle", "stackHeight": null}
        ]);
        let record = normalize(&payload, "SIGLEDGER").unwrap();
        assert_eq!(record.memo_text.as_deref(), Some("hello bundle"));
        assert_eq!(record.memo_raw, None);
    }

    #[test]
    fn test_no_memo_and_no_token_balances() {
        let mut payload = sample_payload();
        payload["transaction"]["message"]["instructions"] = json!([]);
        payload["meta"].as_object_mut().unwrap().remove("preTokenBalances");
        payload["meta"].as_object_mut().unwrap().remove("postTokenBalances");

        let record = normalize(&payload, "SIGLEDGER").unwrap();
        assert!(record.memo_text.is_none());
        assert!(record.token_balance_deltas.is_empty());
    }

    #[test]
    fn test_missing_meta_is_malformed() {
        let mut payload = sample_payload();
        payload["meta"] = Value::Null;
        assert!(matches!(
            normalize(&payload, "SIGLEDGER"),
            Err(NormalizeError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_missing_account_keys_is_malformed() {
        let mut payload = sample_payload();
        payload["transaction"]["message"]
            .as_object_mut()
            .unwrap()
            .remove("accountKeys");
        assert!(normalize(&payload, "SIGLEDGER").is_err());

        payload["transaction"]["message"]["accountKeys"] = json!([]);
        assert!(normalize(&payload, "SIGLEDGER").is_err());
    }

    #[test]
    fn test_missing_native_balances_is_malformed() {
        let mut payload = sample_payload();
        payload["meta"]["preBalances"] = json!([]);
        assert!(normalize(&payload, "SIGLEDGER").is_err());
    }

    #[test]
    fn test_unparsable_token_amount_is_malformed() {
        let mut payload = sample_payload();
        payload["meta"]["postTokenBalances"][0]["uiTokenAmount"]["amount"] = json!("garbage");

        match normalize(&payload, "SIGLEDGER") {
            Err(NormalizeError::MalformedPayload(msg)) => assert!(msg.contains("garbage")),
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_falls_back_to_requested_signature() {
        let mut payload = sample_payload();
        payload["transaction"]["signatures"] = json!([]);
        let record = normalize(&payload, "REQUESTED").unwrap();
        assert_eq!(record.hash, "REQUESTED");
    }
}

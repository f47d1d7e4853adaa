//! Ledger node `getTransaction` client

use {
    super::{FetchBackend, FetchError, RawTransactionPayload, TransactionFetcher},
    async_trait::async_trait,
    serde_json::{json, Value},
    std::time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "processed" => Some(Commitment::Processed),
            "confirmed" => Some(Commitment::Confirmed),
            "finalized" => Some(Commitment::Finalized),
            _ => None,
        }
    }
}

pub struct RpcFetcher {
    client: reqwest::Client,
    rpc_url: String,
    commitment: Commitment,
}

impl RpcFetcher {
    pub fn new(
        rpc_url: impl Into<String>,
        commitment: Commitment,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            commitment,
        })
    }

    /// JSON-RPC body for a single parsed transaction lookup
    pub fn request_body(&self, signature: &str) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [
                signature,
                {
                    "encoding": "jsonParsed",
                    "commitment": self.commitment.as_str(),
                    "maxSupportedTransactionVersion": 0
                }
            ]
        })
    }
}

/// Pull the `result` out of a JSON-RPC response envelope
pub fn unwrap_rpc_response(response: Value) -> Result<Option<Value>, FetchError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(FetchError::Rpc(message));
    }

    match response.get("result") {
        Some(result) if !result.is_null() => Ok(Some(result.clone())),
        _ => Ok(None),
    }
}

#[async_trait]
impl TransactionFetcher for RpcFetcher {
    async fn fetch(&self, signature: &str) -> Result<Option<RawTransactionPayload>, FetchError> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&self.request_body(signature))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        log::debug!("getTransaction {} → {} bytes", signature, body.to_string().len());

        Ok(unwrap_rpc_response(body)?.map(RawTransactionPayload::LedgerRpc))
    }

    fn backend(&self) -> FetchBackend {
        FetchBackend::LedgerRpc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> RpcFetcher {
        RpcFetcher::new("http://127.0.0.1:8899", Commitment::Finalized, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = fetcher().request_body("SIG1");
        assert_eq!(body["method"], "getTransaction");
        assert_eq!(body["params"][0], "SIG1");
        assert_eq!(body["params"][1]["encoding"], "jsonParsed");
        assert_eq!(body["params"][1]["commitment"], "finalized");
    }

    #[test]
    fn test_null_result_is_not_found() {
        let response = json!({"jsonrpc": "2.0", "id": 1, "result": null});
        assert!(unwrap_rpc_response(response).unwrap().is_none());
    }

    #[test]
    fn test_rpc_error_is_surfaced() {
        let response = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid param"}});
        match unwrap_rpc_response(response) {
            Err(FetchError::Rpc(msg)) => assert_eq!(msg, "Invalid param"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_result_is_returned() {
        let response = json!({"jsonrpc": "2.0", "id": 1, "result": {"slot": 5}});
        assert_eq!(unwrap_rpc_response(response).unwrap().unwrap()["slot"], 5);
    }

    #[test]
    fn test_commitment_parse() {
        assert_eq!(Commitment::parse("Confirmed"), Some(Commitment::Confirmed));
        assert_eq!(Commitment::parse("bogus"), None);
    }
}

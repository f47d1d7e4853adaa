//! Enhanced-transactions indexer client
//!
//! Endpoint: `POST {base_url}?api-key={key}` with body
//! `{"transactions": ["<sig>", ...]}`; returns an array of enriched
//! transaction records in request order.

use {
    super::{FetchBackend, FetchError, RawTransactionPayload, TransactionFetcher},
    async_trait::async_trait,
    serde_json::{json, Value},
    std::time::Duration,
};

pub struct IndexerFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IndexerFetcher {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn request_body(signatures: &[&str]) -> Value {
        json!({ "transactions": signatures })
    }
}

/// First record of a batch response; an empty array means not found
pub fn first_record(records: Vec<Value>) -> Option<Value> {
    records.into_iter().next().filter(|r| !r.is_null())
}

#[async_trait]
impl TransactionFetcher for IndexerFetcher {
    async fn fetch(&self, signature: &str) -> Result<Option<RawTransactionPayload>, FetchError> {
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("api-key", self.api_key.as_str())])
            .json(&Self::request_body(&[signature]))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let records: Vec<Value> = response.json().await?;

        Ok(first_record(records).map(RawTransactionPayload::Indexer))
    }

    fn backend(&self) -> FetchBackend {
        FetchBackend::Indexer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_lists_signatures() {
        let body = IndexerFetcher::request_body(&["A", "B"]);
        assert_eq!(body, json!({"transactions": ["A", "B"]}));
    }

    #[test]
    fn test_first_record() {
        assert!(first_record(vec![]).is_none());
        assert!(first_record(vec![Value::Null]).is_none());
        let rec = first_record(vec![json!({"signature": "A"}), json!({"signature": "B"})]).unwrap();
        assert_eq!(rec["signature"], "A");
    }

    #[tokio::test]
    #[ignore] // Run only with a live indexer key
    async fn test_fetch_live() {
        let key = std::env::var("INDEXER_API_KEY").unwrap();
        let fetcher =
            IndexerFetcher::new("https://api.helius.xyz/v0/transactions", key, Duration::from_secs(10)).unwrap();
        let result = fetcher.fetch("1111111111111111111111111111111111111111111111111111111111111111").await;
        assert!(result.is_ok());
    }
}

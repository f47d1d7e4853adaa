//! Memo instruction decoding

/// SPL Memo program (v2)
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Memo text plus the encoded instruction data it came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memo {
    pub text: Option<String>,
    pub raw: Option<String>,
}

impl Memo {
    /// Decode base58 instruction data as UTF-8.
    ///
    /// Undecodable data falls back to the raw encoded string as the text.
    pub fn from_encoded(data: &str) -> Self {
        let text = match bs58::decode(data).into_vec() {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("Memo is not valid UTF-8 ({}), keeping raw data", e);
                    data.to_string()
                }
            },
            Err(e) => {
                log::debug!("Memo is not valid base58 ({}), keeping raw data", e);
                data.to_string()
            }
        };

        Self {
            text: Some(text),
            raw: Some(data.to_string()),
        }
    }

    /// Memo that the upstream already decoded
    pub fn from_parsed(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            raw: None,
        }
    }
}

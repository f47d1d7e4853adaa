//! Signature list loading
//!
//! Accepts either a JSON array of strings or a forgiving brace-delimited
//! list that tolerates `//` comments, unquoted tokens and trailing commas:
//!
//! ```text
//! {
//!     "5Kx...",   // first bundle
//!     3Fz...,
//! }
//! ```

use std::{fmt, path::Path};

#[derive(Debug)]
pub enum SignatureFileError {
    /// Content is neither a brace list nor a JSON array of strings
    Malformed(String),
}

impl fmt::Display for SignatureFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureFileError::Malformed(msg) => write!(f, "Malformed signature file: {}", msg),
        }
    }
}

impl std::error::Error for SignatureFileError {}

/// Remove `//` line comments
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_brace_list(body: &str) -> Vec<String> {
    let inner = body.trim_start_matches('{');
    let inner = inner.strip_suffix('}').unwrap_or(inner);

    inner
        .split(',')
        .map(|piece| piece.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strict parse; callers outside this module use [`parse_signatures`]
pub fn try_parse_signatures(content: &str) -> Result<Vec<String>, SignatureFileError> {
    let cleaned = strip_line_comments(content);
    let trimmed = cleaned.trim();

    if trimmed.starts_with('{') {
        return Ok(parse_brace_list(trimmed));
    }

    let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)
        .map_err(|e| SignatureFileError::Malformed(e.to_string()))?;

    values
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Ok(s.trim().to_string()),
            other => Err(SignatureFileError::Malformed(format!(
                "expected string signature, found {}",
                other
            ))),
        })
        .collect()
}

/// Parse signature file contents, logging and returning an empty list on failure
pub fn parse_signatures(content: &str) -> Vec<String> {
    match try_parse_signatures(content) {
        Ok(signatures) => signatures,
        Err(e) => {
            log::error!("❌ Failed to parse signatures: {}", e);
            Vec::new()
        }
    }
}

/// Read and parse a signature file.
///
/// Only reading can fail; unparsable content yields an empty list.
pub fn load_signatures(path: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let signatures = parse_signatures(&content);
    log::info!(
        "Loaded {} signatures from {}",
        signatures.len(),
        path.as_ref().display()
    );
    Ok(signatures)
}

//! Local inputs: bot execution logs and the signature list to reconcile

pub mod log_parser;
pub mod signature_loader;

pub use log_parser::{
    parse_log_reader, parse_log_text, LogParser, TelemetryEntry, TelemetryMap, TimeInfo, TxType,
    SPAM_REGION,
};
pub use signature_loader::{load_signatures, parse_signatures, SignatureFileError};

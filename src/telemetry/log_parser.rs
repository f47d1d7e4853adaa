//! Bot log parser
//!
//! Scans the trading bot's execution log in a single pass and extracts
//! per-transaction telemetry (routing region, tip type, timings) keyed by
//! transaction signature.
//!
//! ## Recognized lines
//!
//! ```text
//! Total time spent: 182ms, quote time: 41ms
//! Sent static tip transaction to region tokyo: 5Kx...
//! Sent dynamic tip transaction to region amsterdam: 3Fz...
//! Sent spam transaction: 4Qw...
//! ```
//!
//! A timing line applies to every tip/spam line that follows it until the
//! next timing line replaces it. Everything else in the log is ignored.

use {
    indexmap::IndexMap,
    regex::Regex,
    serde::{Deserialize, Serialize},
    std::{fmt, io::BufRead, sync::OnceLock},
};

/// Region recorded for spam transactions, regardless of log context
pub const SPAM_REGION: &str = "spam";

fn ansi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ansi regex"))
}

fn time_info_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)total time spent:\s*(\d+(?:\.\d+)?)\s*ms\b.*?quote time:\s*(\d+(?:\.\d+)?)\s*ms")
            .expect("valid time info regex")
    })
}

fn tip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)sent (static|dynamic) tip transaction to region ([A-Za-z0-9_-]+)\s*:\s*([A-Za-z0-9]+)")
            .expect("valid tip regex")
    })
}

fn spam_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:sent spam transaction|spam transaction sent)\b[^:]*:\s*([A-Za-z0-9]+)")
            .expect("valid spam regex")
    })
}

/// Kind of transaction attempt recorded by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Static,
    Dynamic,
    Spam,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Static => "static",
            TxType::Dynamic => "dynamic",
            TxType::Spam => "spam",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "static" => Some(TxType::Static),
            "dynamic" => Some(TxType::Dynamic),
            _ => None,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing pair carried forward from the most recent timing line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInfo {
    pub time_spent_ms: f64,
    pub quote_time_ms: f64,
}

/// Telemetry recorded for one transaction signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEntry {
    pub signature: String,
    pub region: String,
    pub tx_type: TxType,
    pub time_spent_ms: Option<f64>,
    pub quote_time_ms: Option<f64>,
}

/// Signature → telemetry mapping in first-seen order.
///
/// Inserting a signature that is already present replaces its entry
/// (last write wins) while keeping its original position.
#[derive(Debug, Clone, Default)]
pub struct TelemetryMap {
    entries: IndexMap<String, TelemetryEntry>,
}

impl TelemetryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the entry that was overwritten, if any
    pub fn insert(&mut self, entry: TelemetryEntry) -> Option<TelemetryEntry> {
        self.entries.insert(entry.signature.clone(), entry)
    }

    pub fn get(&self, signature: &str) -> Option<&TelemetryEntry> {
        self.entries.get(signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetryEntry> {
        self.entries.values()
    }
}

/// Remove terminal color escape sequences from a log line
pub fn strip_ansi(line: &str) -> std::borrow::Cow<'_, str> {
    ansi_regex().replace_all(line, "")
}

/// Single-pass stateful scanner over bot log lines
#[derive(Debug, Default)]
pub struct LogParser {
    last_time_info: Option<TimeInfo>,
    entries: TelemetryMap,
    dropped_tip_lines: usize,
}

impl LogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one log line
    pub fn feed_line(&mut self, raw_line: &str) {
        let line = strip_ansi(raw_line);

        if let Some(caps) = time_info_regex().captures(&line) {
            let time_spent = caps[1].parse::<f64>();
            let quote_time = caps[2].parse::<f64>();
            if let (Ok(time_spent_ms), Ok(quote_time_ms)) = (time_spent, quote_time) {
                self.last_time_info = Some(TimeInfo {
                    time_spent_ms,
                    quote_time_ms,
                });
            }
            return;
        }

        if let Some(caps) = tip_regex().captures(&line) {
            let Some(tx_type) = TxType::from_tag(&caps[1]) else {
                return;
            };
            let signature = caps[3].to_string();

            match self.last_time_info {
                Some(info) => {
                    self.record(TelemetryEntry {
                        signature,
                        region: caps[2].to_string(),
                        tx_type,
                        time_spent_ms: Some(info.time_spent_ms),
                        quote_time_ms: Some(info.quote_time_ms),
                    });
                }
                None => {
                    // Tip lines need timing context; without it the line is dropped
                    log::debug!("Dropping tip line without prior timing info: {}", signature);
                    self.dropped_tip_lines += 1;
                }
            }
            return;
        }

        if let Some(caps) = spam_regex().captures(&line) {
            self.record(TelemetryEntry {
                signature: caps[1].to_string(),
                region: SPAM_REGION.to_string(),
                tx_type: TxType::Spam,
                time_spent_ms: self.last_time_info.map(|t| t.time_spent_ms),
                quote_time_ms: self.last_time_info.map(|t| t.quote_time_ms),
            });
        }
    }

    fn record(&mut self, entry: TelemetryEntry) {
        if let Some(previous) = self.entries.insert(entry) {
            log::debug!("Telemetry for {} overwritten by a later log line", previous.signature);
        }
    }

    /// Current carried timing context
    pub fn last_time_info(&self) -> Option<TimeInfo> {
        self.last_time_info
    }

    /// Number of tip lines dropped for lack of timing context
    pub fn dropped_tip_lines(&self) -> usize {
        self.dropped_tip_lines
    }

    pub fn finish(self) -> TelemetryMap {
        self.entries
    }
}

/// Parse an in-memory log
pub fn parse_log_text(text: &str) -> TelemetryMap {
    let mut parser = LogParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Parse a log from a buffered reader, line by line.
///
/// Lines that are not valid UTF-8 are decoded lossily rather than aborting.
pub fn parse_log_reader<R: BufRead>(mut reader: R) -> std::io::Result<TelemetryMap> {
    let mut parser = LogParser::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        parser.feed_line(line.trim_end_matches(['\n', '\r']));
    }

    if parser.dropped_tip_lines() > 0 {
        log::warn!(
            "⚠️  {} tip line(s) appeared before any timing line and were skipped",
            parser.dropped_tip_lines()
        );
    }

    Ok(parser.finish())
}

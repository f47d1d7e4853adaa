//! Rejects tokens that look like recycled report output rather than signatures
//!
//! When a previous report is mistakenly fed back in as the signature list,
//! its region names, section headers and statistic labels show up as
//! "signatures". They are filtered here before any network call is made.

/// Region tokens written into report rows and grouped sections
pub const KNOWN_REGIONS: &[&str] = &[
    "amsterdam",
    "frankfurt",
    "ny",
    "tokyo",
    "slc",
    "london",
    "singapore",
    "dublin",
    "unknown",
    "spam",
];

/// Section headers and labels that appear in a generated report
pub const REPORT_LABELS: &[&str] = &[
    "signature",
    "statistics",
    "transactions by type",
    "transactions by region",
    "type",
    "region",
    "count",
    "average time spent (ms)",
    "average quote time (ms)",
];

/// Returns true when `token` cannot be a transaction signature
pub fn is_report_artifact(token: &str) -> bool {
    let normalized = token.trim().to_ascii_lowercase();

    if normalized.is_empty() {
        return true;
    }

    KNOWN_REGIONS.contains(&normalized.as_str()) || REPORT_LABELS.contains(&normalized.as_str())
}

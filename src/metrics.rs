//! Financial metrics derived from a canonical transaction record
//!
//! All amounts are in SOL. Token-denominated fields render with 9
//! decimals, percentages and USD with 2.

use {
    crate::{
        fetcher::FetchBackend,
        normalizer::{CanonicalTransactionRecord, LAMPORTS_PER_SOL, WSOL_MINT},
    },
    serde::Serialize,
};

/// Share of the tip charged as bot fee
pub const BOT_FEE_RATE: f64 = 0.1;

/// Flat fee percentage reported for every transaction
pub const FIXED_FEE_PERCENTAGE: f64 = 1.5;

/// Fixed SOL → USD conversion; there is no live price source
pub const SOL_PRICE_USD: f64 = 30.0;

/// How tip percentage is computed when the fee payer received no WSOL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipPercentagePolicy {
    /// Zero inflow yields 0%
    ZeroWhenNoInflow,
    /// Plain division; zero inflow yields a non-finite value
    Unguarded,
}

impl TipPercentagePolicy {
    pub fn for_backend(backend: FetchBackend) -> Self {
        match backend {
            FetchBackend::LedgerRpc => TipPercentagePolicy::ZeroWhenNoInflow,
            FetchBackend::Indexer => TipPercentagePolicy::Unguarded,
        }
    }

    pub fn tip_percentage(&self, tip: f64, total_in: f64) -> f64 {
        match self {
            TipPercentagePolicy::ZeroWhenNoInflow if total_in <= 0.0 => 0.0,
            _ => tip / total_in * 100.0,
        }
    }
}

/// Fee payer WSOL movement and tip, in SOL
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WsolFlows {
    pub total_in: f64,
    pub total_out: f64,
    pub tip: f64,
}

impl WsolFlows {
    pub fn new(total_in: f64, total_out: f64, tip: f64) -> Self {
        Self { total_in, total_out, tip }
    }

    /// Sum the fee payer's WSOL deltas: positives into `total_in`,
    /// absolute negatives into `total_out`
    pub fn from_record(record: &CanonicalTransactionRecord) -> Self {
        let (total_in, total_out) = record
            .token_balance_deltas
            .iter()
            .filter(|d| d.mint == WSOL_MINT && d.owner.as_deref() == Some(record.fee_payer.as_str()))
            .fold((0.0, 0.0), |(inflow, outflow), d| {
                if d.delta > 0.0 {
                    (inflow + d.delta, outflow)
                } else {
                    (inflow, outflow + d.delta.abs())
                }
            });

        Self {
            total_in,
            total_out,
            tip: record.tip_lamports as f64 / LAMPORTS_PER_SOL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancialMetrics {
    pub total_wsol_in: f64,
    pub total_wsol_out: f64,
    pub tip: f64,
    pub bot_fee: f64,
    pub tip_percentage: f64,
    pub fixed_fee_percentage: f64,
    pub profit: f64,
    pub profit_usd: f64,
}

impl FinancialMetrics {
    pub fn calculate(flows: WsolFlows, policy: TipPercentagePolicy) -> Self {
        let profit = flows.total_in - flows.total_out;

        Self {
            total_wsol_in: flows.total_in,
            total_wsol_out: flows.total_out,
            tip: flows.tip,
            bot_fee: flows.tip * BOT_FEE_RATE,
            tip_percentage: policy.tip_percentage(flows.tip, flows.total_in),
            fixed_fee_percentage: FIXED_FEE_PERCENTAGE,
            profit,
            profit_usd: profit * SOL_PRICE_USD,
        }
    }

    /// Metrics for a record, using the tip policy of the backend it came from
    pub fn from_record(record: &CanonicalTransactionRecord) -> Self {
        Self::calculate(
            WsolFlows::from_record(record),
            TipPercentagePolicy::for_backend(record.backend),
        )
    }

    pub fn render(&self) -> RenderedMetrics {
        RenderedMetrics {
            total_wsol_in: format_fixed(self.total_wsol_in, 9),
            total_wsol_out: format_fixed(self.total_wsol_out, 9),
            tip: format_fixed(self.tip, 9),
            bot_fee: format_fixed(self.bot_fee, 9),
            tip_percentage: format_fixed(self.tip_percentage, 2),
            fixed_fee_percentage: format_fixed(self.fixed_fee_percentage, 2),
            profit: format_fixed(self.profit, 9),
            profit_usd: format_usd(self.profit_usd),
        }
    }
}

/// Report-ready string form of [`FinancialMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMetrics {
    pub total_wsol_in: String,
    pub total_wsol_out: String,
    pub tip: String,
    pub bot_fee: String,
    pub tip_percentage: String,
    pub fixed_fee_percentage: String,
    pub profit: String,
    pub profit_usd: String,
}

/// Fixed-point rendering. Infinities render as `Infinity`/`-Infinity`,
/// NaN as an empty string.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    // avoid "-0.00"
    let value = if value == 0.0 { 0.0 } else { value };
    let rendered = format!("{:.*}", decimals, value);
    if rendered.starts_with('-') && rendered[1..].chars().all(|c| c == '0' || c == '.') {
        rendered[1..].to_string()
    } else {
        rendered
    }
}

pub fn format_usd(value: f64) -> String {
    let amount = format_fixed(value, 2);
    if amount.is_empty() {
        return amount;
    }
    match amount.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", amount),
    }
}

//! Aggregate statistics over reconciled rows

use {super::ReconciledRow, indexmap::IndexMap, serde::Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub found_count: usize,
    pub average_time_spent_ms: Option<f64>,
    pub average_quote_time_ms: Option<f64>,
    /// Counts in first-seen order
    pub counts_by_type: IndexMap<String, usize>,
    pub counts_by_region: IndexMap<String, usize>,
}

impl AggregateStats {
    /// Statistics over found rows; `None` when no row was found
    pub fn from_rows(rows: &[ReconciledRow]) -> Option<Self> {
        rows.iter()
            .filter(|row| row.found)
            .fold(StatsAccumulator::default(), StatsAccumulator::add)
            .finalize()
    }
}

#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
pub struct StatsAccumulator {
    rows: usize,
    time_spent: Mean,
    quote_time: Mean,
    by_type: IndexMap<String, usize>,
    by_region: IndexMap<String, usize>,
}

impl StatsAccumulator {
    pub fn add(mut self, row: &ReconciledRow) -> Self {
        self.rows += 1;
        self.time_spent.push(row.time_spent_ms);
        self.quote_time.push(row.quote_time_ms);
        *self.by_type.entry(row.tx_type.clone()).or_insert(0) += 1;
        *self.by_region.entry(row.region.clone()).or_insert(0) += 1;
        self
    }

    pub fn finalize(self) -> Option<AggregateStats> {
        if self.rows == 0 {
            return None;
        }

        Some(AggregateStats {
            found_count: self.rows,
            average_time_spent_ms: self.time_spent.value(),
            average_quote_time_ms: self.quote_time.value(),
            counts_by_type: self.by_type,
            counts_by_region: self.by_region,
        })
    }
}

use {
    super::{ReportBackend, ReportError},
    crate::{
        metrics::RenderedMetrics,
        reconcile::{AggregateStats, ReconciledRow},
    },
    serde::Serialize,
    std::io::{BufWriter, Write},
};

/// One JSON line per reconciled row
#[derive(Debug, Serialize)]
struct RowLine<'a> {
    signature: &'a str,
    #[serde(rename = "type")]
    tx_type: &'a str,
    region: &'a str,
    time_spent_ms: Option<f64>,
    quote_time_ms: Option<f64>,
    found: bool,
    block_time: Option<String>,
    fee_payer: Option<&'a str>,
    memo: Option<&'a str>,
    #[serde(flatten)]
    metrics: Option<RenderedMetrics>,
}

#[derive(Debug, Serialize)]
struct StatsLine<'a> {
    statistics: &'a AggregateStats,
}

pub struct JsonlReportWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> JsonlReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
        }
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<(), ReportError> {
        let json = serde_json::to_string(value)?;
        writeln!(self.out, "{}", json)?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, ReportError> {
        self.out
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}

impl<W: Write> ReportBackend for JsonlReportWriter<W> {
    fn write_report(
        &mut self,
        rows: &[ReconciledRow],
        stats: Option<&AggregateStats>,
    ) -> Result<(), ReportError> {
        for row in rows {
            let line = RowLine {
                signature: &row.signature,
                tx_type: &row.tx_type,
                region: &row.region,
                time_spent_ms: row.time_spent_ms,
                quote_time_ms: row.quote_time_ms,
                found: row.found,
                block_time: row.record.as_ref().and_then(|r| r.block_time_rfc3339()),
                fee_payer: row.record.as_ref().map(|r| r.fee_payer.as_str()),
                memo: row.record.as_ref().and_then(|r| r.memo_text.as_deref()),
                metrics: row.metrics.as_ref().map(|m| m.render()),
            };
            self.write_json(&line)?;
        }

        if let Some(statistics) = stats {
            self.write_json(&StatsLine { statistics })?;
        }

        self.out.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

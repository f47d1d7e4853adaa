use {
    super::{ReportBackend, ReportError},
    crate::{
        metrics::format_fixed,
        reconcile::{AggregateStats, ReconciledRow},
    },
    std::io::{BufWriter, Write},
};

pub const CSV_HEADER: &[&str] = &[
    "signature",
    "type",
    "region",
    "time_spent_ms",
    "quote_time_ms",
    "found",
    "block_time",
    "fee_payer",
    "total_wsol_in",
    "total_wsol_out",
    "tip",
    "bot_fee",
    "tip_percentage",
    "fixed_fee_percentage",
    "profit",
    "profit_usd",
    "memo",
];

/// Quote a field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row_fields(row: &ReconciledRow) -> Vec<String> {
    let mut fields = vec![
        row.signature.clone(),
        row.tx_type.clone(),
        row.region.clone(),
        optional_number(row.time_spent_ms),
        optional_number(row.quote_time_ms),
        row.found.to_string(),
    ];

    match &row.record {
        Some(record) => {
            fields.push(record.block_time_rfc3339().unwrap_or_default());
            fields.push(record.fee_payer.clone());
        }
        None => fields.extend([String::new(), String::new()]),
    }

    match row.metrics.as_ref().map(|m| m.render()) {
        Some(m) => fields.extend([
            m.total_wsol_in,
            m.total_wsol_out,
            m.tip,
            m.bot_fee,
            m.tip_percentage,
            m.fixed_fee_percentage,
            m.profit,
            m.profit_usd,
        ]),
        None => fields.extend(std::iter::repeat(String::new()).take(8)),
    }

    fields.push(
        row.record
            .as_ref()
            .and_then(|r| r.memo_text.clone())
            .unwrap_or_default(),
    );

    fields
}

pub struct CsvReportWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> CsvReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
        }
    }

    fn write_line<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), ReportError> {
        let line = fields
            .iter()
            .map(|f| escape_field(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn write_stats(&mut self, stats: &AggregateStats) -> Result<(), ReportError> {
        let average = |v: Option<f64>| v.map(|v| format_fixed(v, 2)).unwrap_or_default();

        writeln!(self.out)?;
        self.write_line(&["Statistics"])?;
        self.write_line(&[
            "Average Time Spent (ms)".to_string(),
            average(stats.average_time_spent_ms),
        ])?;
        self.write_line(&[
            "Average Quote Time (ms)".to_string(),
            average(stats.average_quote_time_ms),
        ])?;

        writeln!(self.out)?;
        self.write_line(&["Transactions by Type"])?;
        self.write_line(&["Type", "Count"])?;
        for (tx_type, count) in &stats.counts_by_type {
            self.write_line(&[tx_type.clone(), count.to_string()])?;
        }

        writeln!(self.out)?;
        self.write_line(&["Transactions by Region"])?;
        self.write_line(&["Region", "Count"])?;
        for (region, count) in &stats.counts_by_region {
            self.write_line(&[region.clone(), count.to_string()])?;
        }

        Ok(())
    }

    pub fn into_inner(self) -> Result<W, ReportError> {
        self.out
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}

impl<W: Write> ReportBackend for CsvReportWriter<W> {
    fn write_report(
        &mut self,
        rows: &[ReconciledRow],
        stats: Option<&AggregateStats>,
    ) -> Result<(), ReportError> {
        self.write_line(CSV_HEADER)?;
        for row in rows {
            let fields = row_fields(row);
            self.write_line(fields.as_slice())?;
        }
        if let Some(stats) = stats {
            self.write_stats(stats)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetcher::FetchBackend,
        normalizer::{CanonicalTransactionRecord, TokenBalanceDelta, WSOL_MINT},
        telemetry::{TelemetryEntry, TxType},
    };

    fn render(rows: &[ReconciledRow]) -> String {
        let stats = AggregateStats::from_rows(rows);
        let mut writer = CsvReportWriter::new(Vec::new());
        writer.write_report(rows, stats.as_ref()).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    fn found_row() -> ReconciledRow {
        let telemetry = TelemetryEntry {
            signature: "SIG1".to_string(),
            region: "tokyo".to_string(),
            tx_type: TxType::Static,
            time_spent_ms: Some(120.0),
            quote_time_ms: Some(30.0),
        };
        let record = CanonicalTransactionRecord {
            hash: "SIG1".to_string(),
            backend: FetchBackend::LedgerRpc,
            slot: Some(1),
            block_timestamp: Some(0),
            fee_payer: "Bot".to_string(),
            token_balance_deltas: vec![
                TokenBalanceDelta { mint: WSOL_MINT.to_string(), owner: Some("Bot".to_string()), delta: 2.0 },
                TokenBalanceDelta { mint: WSOL_MINT.to_string(), owner: Some("Bot".to_string()), delta: -1.2 },
            ],
            native_transfers: vec![],
            tip_lamports: 10_000_000,
            memo_text: Some("route, a".to_string()),
            memo_raw: None,
        };
        ReconciledRow::build("SIG1", Some(&telemetry), Some(record))
    }

    #[test]
    fn test_found_row_and_sections() {
        let rows = vec![found_row(), ReconciledRow::build("SIG2", None, None)];
        let out = render(&rows);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "SIG1,static,tokyo,120,30,true,1970-01-01T00:00:00+00:00,Bot,2.000000000,1.200000000,0.010000000,0.001000000,0.50,1.50,0.800000000,$24.00,\"route, a\""
        );
        assert_eq!(lines[2], "SIG2,unknown,unknown,,,false,,,,,,,,,,,");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Statistics");
        assert_eq!(lines[5], "Average Time Spent (ms),120.00");
        assert_eq!(lines[6], "Average Quote Time (ms),30.00");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "Transactions by Type");
        assert_eq!(lines[9], "Type,Count");
        assert_eq!(lines[10], "static,1");
        assert_eq!(lines[12], "Transactions by Region");
        assert_eq!(lines[14], "tokyo,1");
        assert!(!out.contains("NaN"));
        assert!(!out.contains("null"));
    }

    #[test]
    fn test_no_found_rows_writes_no_statistics() {
        let rows = vec![ReconciledRow::build("SIG2", None, None)];
        let out = render(&rows);
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("Statistics"));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}

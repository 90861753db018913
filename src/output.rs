use crate::types::TableResult;
use anyhow::Result;
use csv::{Writer, WriterBuilder};
use std::io::Write;

/// Printed in the p-value column when the test refused to run.
pub const MISSING_P_VALUE: &str = "NA";

/// Format like C's `%e`: six decimals and a signed, two-digit exponent.
pub fn format_scientific(x: f64) -> String {
    let s = format!("{:.6e}", x);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s, // inf, NaN
    }
}

/// Tab-separated result rows: `d0 d1 d2 h0 h1 h2 p_value`
pub struct ResultWriter<W: Write> {
    wtr: Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        let wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(sink);
        Self { wtr }
    }

    pub fn write(&mut self, result: &TableResult) -> Result<()> {
        let p_value = match result.p_value {
            Ok(p) => format_scientific(p),
            Err(_) => MISSING_P_VALUE.to_string(),
        };
        let mut record: Vec<String> = result.table.counts().iter().map(|c| c.to_string()).collect();
        record.push(p_value);
        self.wtr.write_record(&record)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}

/// Write all results, one line per table.
pub fn write_results<W: Write>(results: &[TableResult], sink: W) -> Result<()> {
    let mut wtr = ResultWriter::new(sink);
    for result in results {
        wtr.write(result)?;
    }
    wtr.finish()
}

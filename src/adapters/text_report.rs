//! Plain-text transaction report adapter.
//!
//! One fixed-width table per symbol followed by its totals line, written to
//! a single output file.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::domain::error::BacktestError;
use crate::domain::ledger::Transaction;
use crate::domain::summary::LedgerSummary;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

const HEADER: &str = "date        act      price     volume          fee          tax   total_value    total_cost           nav        profit          cash";

impl TextReportAdapter {
    pub fn new() -> Self {
        TextReportAdapter
    }

    fn format_row(tx: &Transaction) -> String {
        format!(
            "{}  {:>3} {:>10.2} {:>10} {:>12.2} {:>12.2} {:>13.2} {:>13.2} {:>13.2} {:>13.2} {:>13.2}",
            tx.date.format("%Y-%m-%d"),
            tx.action.letter(),
            tx.price,
            tx.volume,
            tx.fee,
            tx.tax,
            tx.total_value,
            tx.total_cost,
            tx.nav,
            tx.profit,
            tx.cash_balance,
        )
    }

    fn write_symbol(
        out: &mut impl Write,
        symbol: &str,
        summary: &LedgerSummary,
    ) -> std::io::Result<()> {
        writeln!(out, "=== {symbol} ===")?;
        if summary.transactions.is_empty() {
            writeln!(out, "no transactions")?;
            writeln!(out)?;
            return Ok(());
        }
        writeln!(out, "{HEADER}")?;
        for tx in &summary.transactions {
            writeln!(out, "{}", Self::format_row(tx))?;
        }
        writeln!(
            out,
            "total_profit {:>15.2}  profit_pct {:>8.2}%  total_fee {:>12.2}  total_tax {:>12.2}  total_cost {:>12.2}",
            summary.total_profit,
            summary.profit_pct,
            summary.total_fee,
            summary.total_tax,
            summary.total_cost,
        )?;
        writeln!(out)?;
        Ok(())
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        summaries: &[(String, LedgerSummary)],
        output_path: &str,
    ) -> Result<(), BacktestError> {
        let mut out = BufWriter::new(File::create(output_path)?);
        for (symbol, summary) in summaries {
            Self::write_symbol(&mut out, symbol, summary)?;
        }
        out.flush()?;
        Ok(())
    }
}

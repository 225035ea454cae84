//! Report generation port trait.

use crate::domain::error::BacktestError;
use crate::domain::summary::LedgerSummary;

/// Port for writing per-symbol transaction reports.
pub trait ReportPort {
    fn write(
        &self,
        summaries: &[(String, LedgerSummary)],
        output_path: &str,
    ) -> Result<(), BacktestError>;
}

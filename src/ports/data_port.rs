//! Historical data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::price_bar::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch the close-price history for one symbol over [from, to],
    /// sorted ascending by timestamp.
    ///
    /// Exhausted retries surface as [`BacktestError::NoData`]; callers are
    /// expected to treat that as "proceed with empty history" rather than
    /// aborting the run.
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError>;
}

//! Price bar representation.

use chrono::NaiveDateTime;

/// One (timestamp, closing price) observation. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        PriceBar { timestamp, close }
    }
}

/// Sort bars ascending by timestamp. Stable, so bars sharing a timestamp
/// keep their arrival order.
pub fn sort_bars(bars: &mut [PriceBar]) {
    bars.sort_by_key(|b| b.timestamp);
}

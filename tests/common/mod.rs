#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use emacross::domain::error::BacktestError;
use emacross::domain::ledger::AccountingConfig;
pub use emacross::domain::price_bar::PriceBar;
use emacross::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub missing: Vec<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            missing: Vec::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_no_data(mut self, symbol: &str) -> Self {
        self.missing.push(symbol.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        if self.missing.iter().any(|s| s == symbol) {
            return Err(BacktestError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(day_offset: i64, close: f64) -> PriceBar {
    PriceBar::new(date(2024, 1, 1) + chrono::Duration::days(day_offset), close)
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as i64, close))
        .collect()
}

pub fn frictionless_config(initial_cash: f64) -> AccountingConfig {
    AccountingConfig {
        initial_cash,
        fee_pct: 0.0,
        tax_pct: 0.0,
        friction_pct: 0.0,
        lot_size: 100,
    }
}

pub fn hose_config(initial_cash: f64) -> AccountingConfig {
    AccountingConfig {
        initial_cash,
        ..AccountingConfig::default()
    }
}

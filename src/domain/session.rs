//! Per-symbol processing context.
//!
//! One session owns the EMA state, position flag, and ledger for a single
//! symbol, replacing shared per-symbol maps with an explicit object that is
//! built, run, and dropped in one sequential pass.

use tracing::info;

use super::crossover::CrossoverDetector;
use super::ema::Ema;
use super::ledger::{AccountingConfig, Ledger};
use super::price_bar::PriceBar;
use super::summary::LedgerSummary;

pub struct SymbolSession {
    symbol: String,
    ema: Ema,
    accounting: AccountingConfig,
}

impl SymbolSession {
    pub fn new(symbol: impl Into<String>, ema_period: usize, accounting: AccountingConfig) -> Self {
        let symbol = symbol.into();
        SymbolSession {
            ema: Ema::new(ema_period),
            symbol,
            accounting,
        }
    }

    /// Session with a warm-started EMA.
    pub fn with_ema(symbol: impl Into<String>, ema: Ema, accounting: AccountingConfig) -> Self {
        SymbolSession {
            symbol: symbol.into(),
            ema,
            accounting,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Drive the ordered bar series through crossover detection and the
    /// ledger, then take the summary pass. An empty series produces an empty
    /// summary rather than an error.
    pub fn run(self, bars: &[PriceBar]) -> LedgerSummary {
        let initial_cash = self.accounting.initial_cash;
        if bars.is_empty() {
            info!(symbol = %self.symbol, "no historical data, skipping signal pass");
            return LedgerSummary::compute(&[], initial_cash);
        }

        let mut ledger = Ledger::new(self.symbol.clone(), self.accounting);
        for event in CrossoverDetector::new(bars, self.ema) {
            ledger.apply(&event);
        }

        info!(
            symbol = %self.symbol,
            transactions = ledger.transactions().len(),
            "signal pass complete"
        );
        LedgerSummary::compute(ledger.transactions(), initial_cash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::Action;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PriceBar::new(
                    NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap(),
                    close,
                )
            })
            .collect()
    }

    fn frictionless() -> AccountingConfig {
        AccountingConfig {
            initial_cash: 1_000_000.0,
            fee_pct: 0.0,
            tax_pct: 0.0,
            friction_pct: 0.0,
            lot_size: 100,
        }
    }

    #[test]
    fn empty_series_produces_empty_summary() {
        let session = SymbolSession::new("ACB", 20, frictionless());
        let summary = session.run(&[]);
        assert!(summary.transactions.is_empty());
        assert_relative_eq!(summary.total_profit, 0.0);
    }

    #[test]
    fn round_trip_through_the_pipeline() {
        // Dip below the warm EMA, recover, dip again: one buy then one sell.
        let bars = make_bars(&[10.0, 10.0, 9.0, 11.0, 9.0]);
        let session =
            SymbolSession::with_ema("ACB", Ema::with_state(1, 0.5, 10.0), frictionless());
        let summary = session.run(&bars);

        let actions: Vec<Action> = summary.transactions.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![Action::Buy, Action::Sell]);
        assert_eq!(
            summary.transactions[0].volume,
            summary.transactions[1].volume
        );
    }

    #[test]
    fn warmup_longer_than_series_yields_no_trades() {
        let bars = make_bars(&[9.0, 11.0, 9.0]);
        let session = SymbolSession::new("ACB", 10, frictionless());
        let summary = session.run(&bars);
        assert!(summary.transactions.is_empty());
    }
}

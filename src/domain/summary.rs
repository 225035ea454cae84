//! End-of-run ledger summary.
//!
//! A pure recomputation pass over the recorded transactions: running cash
//! balance, per-entry NAV, realized profit, and aggregate totals are all
//! derived from price/volume/fee/tax alone, so running the pass twice over
//! the same ledger produces identical results.

use super::ledger::{Action, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    /// Entries after the bootstrap adjustment, with cash/NAV/profit
    /// recomputed in order.
    pub transactions: Vec<Transaction>,
    pub total_profit: f64,
    /// total_profit / nav_sum * 100; zero when nav_sum is zero.
    pub profit_pct: f64,
    pub total_fee: f64,
    pub total_tax: f64,
    pub total_cost: f64,
    pub nav_sum: f64,
}

impl LedgerSummary {
    pub fn compute(transactions: &[Transaction], initial_cash: f64) -> Self {
        // Bootstrap tie-break: a leading sell has no matching buy and cannot
        // realize profit, so it is dropped before totals are taken.
        let entries = match transactions.first() {
            Some(tx) if tx.action == Action::Sell => &transactions[1..],
            _ => transactions,
        };

        let mut recomputed = Vec::with_capacity(entries.len());
        let mut cash = initial_cash;
        let mut last_buy_nav: Option<f64> = None;

        for tx in entries {
            let total_cost = tx.fee + tx.tax;
            let nav = tx.total_value - total_cost;
            let profit = match tx.action {
                Action::Buy => {
                    cash -= tx.total_value + total_cost;
                    last_buy_nav = Some(nav);
                    0.0
                }
                Action::Sell => {
                    cash += tx.total_value - total_cost;
                    let buy_nav = last_buy_nav.take().unwrap_or(nav);
                    nav - buy_nav
                }
            };

            recomputed.push(Transaction {
                total_cost,
                nav,
                profit,
                cash_balance: cash,
                ..tx.clone()
            });
        }

        let total_profit: f64 = recomputed.iter().map(|t| t.profit).sum();
        let total_fee: f64 = recomputed.iter().map(|t| t.fee).sum();
        let total_tax: f64 = recomputed.iter().map(|t| t.tax).sum();
        let nav_sum: f64 = recomputed.iter().map(|t| t.nav).sum();
        let profit_pct = if nav_sum != 0.0 {
            total_profit / nav_sum * 100.0
        } else {
            0.0
        };

        LedgerSummary {
            transactions: recomputed,
            total_profit,
            profit_pct,
            total_fee,
            total_tax,
            total_cost: total_fee + total_tax,
            nav_sum,
        }
    }
}

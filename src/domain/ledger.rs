//! Transaction ledger and fee/tax accounting.
//!
//! Single-lot position discipline: at most one open lot per symbol. A buy
//! crossover while flat opens a lot sized from available cash; a sell
//! crossover while invested liquidates exactly that lot. Events that arrive
//! in the matching state already are ignored, not errors.

use chrono::NaiveDateTime;
use tracing::warn;

use super::crossover::{Crossover, CrossoverEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn letter(&self) -> &'static str {
        match self {
            Action::Buy => "B",
            Action::Sell => "S",
        }
    }
}

/// One ledger entry. Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub symbol: String,
    pub action: Action,
    pub price: f64,
    pub volume: i64,
    pub fee: f64,
    pub tax: f64,
    pub total_value: f64,
    pub total_cost: f64,
    /// total_value minus fees and taxes.
    pub nav: f64,
    /// Realized profit; zero for buys.
    pub profit: f64,
    /// Cash balance after this transaction settled.
    pub cash_balance: f64,
    pub date: NaiveDateTime,
}

/// Externally supplied accounting parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountingConfig {
    pub initial_cash: f64,
    /// Brokerage fee as a fraction of total value, both sides.
    pub fee_pct: f64,
    /// Sell-side tax as a fraction of total value.
    pub tax_pct: f64,
    /// Haircut applied to cash before sizing a purchase.
    pub friction_pct: f64,
    /// Volumes are floored to multiples of this.
    pub lot_size: i64,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        AccountingConfig {
            initial_cash: 1_000_000_000.0,
            fee_pct: 0.0015,
            tax_pct: 0.001,
            friction_pct: 0.0015,
            lot_size: 100,
        }
    }
}

/// Floor `purchasing_power / price` to a whole number of shares, then down
/// to a lot multiple. Friction is already applied by the caller.
pub fn lot_volume(purchasing_power: f64, price: f64, lot_size: i64) -> i64 {
    if price <= 0.0 || lot_size <= 0 {
        return 0;
    }
    let raw = (purchasing_power / price).floor() as i64;
    (raw / lot_size) * lot_size
}

#[derive(Debug, Clone)]
struct OpenLot {
    volume: i64,
    nav: f64,
}

/// Per-symbol transaction ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    symbol: String,
    config: AccountingConfig,
    cash: f64,
    open_lot: Option<OpenLot>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(symbol: impl Into<String>, config: AccountingConfig) -> Self {
        let cash = config.initial_cash;
        Ledger {
            symbol: symbol.into(),
            config,
            cash,
            open_lot: None,
            transactions: Vec::new(),
        }
    }

    pub fn is_invested(&self) -> bool {
        self.open_lot.is_some()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    /// Route a crossover event through the position discipline.
    pub fn apply(&mut self, event: &CrossoverEvent) {
        match event.direction {
            Crossover::Buy => self.record_buy(event.price, event.timestamp),
            Crossover::Sell => self.record_sell(event.price, event.timestamp),
        }
    }

    fn record_buy(&mut self, price: f64, date: NaiveDateTime) {
        if self.open_lot.is_some() {
            return;
        }

        let purchasing_power = self.cash * (1.0 - self.config.friction_pct);
        let volume = lot_volume(purchasing_power, price, self.config.lot_size);
        if volume <= 0 {
            warn!(symbol = %self.symbol, price, "buy signal below one lot, skipping");
            return;
        }

        let total_value = volume as f64 * price;
        let fee = self.config.fee_pct * total_value;
        let tax = 0.0;
        if !self.accept(price, volume, total_value) {
            return;
        }

        self.cash -= total_value + fee + tax;
        let nav = total_value - fee - tax;
        self.open_lot = Some(OpenLot { volume, nav });
        self.transactions.push(Transaction {
            symbol: self.symbol.clone(),
            action: Action::Buy,
            price,
            volume,
            fee,
            tax,
            total_value,
            total_cost: fee + tax,
            nav,
            profit: 0.0,
            cash_balance: self.cash,
            date,
        });
    }

    fn record_sell(&mut self, price: f64, date: NaiveDateTime) {
        let Some(lot) = self.open_lot.as_ref() else {
            return;
        };

        // Exact match against the open lot; partial liquidation unsupported.
        let volume = lot.volume;
        let total_value = volume as f64 * price;
        let fee = self.config.fee_pct * total_value;
        let tax = self.config.tax_pct * total_value;
        if !self.accept(price, volume, total_value) {
            return;
        }

        self.cash += total_value - fee - tax;
        let nav = total_value - fee - tax;
        let profit = nav - lot.nav;
        self.open_lot = None;
        self.transactions.push(Transaction {
            symbol: self.symbol.clone(),
            action: Action::Sell,
            price,
            volume,
            fee,
            tax,
            total_value,
            total_cost: fee + tax,
            nav,
            profit,
            cash_balance: self.cash,
            date,
        });
    }

    fn accept(&self, price: f64, volume: i64, total_value: f64) -> bool {
        if price < 0.0 || volume < 0 || total_value < 0.0 {
            warn!(
                symbol = %self.symbol,
                price,
                volume,
                total_value,
                "rejecting invalid transaction"
            );
            return false;
        }
        true
    }
}

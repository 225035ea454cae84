//! Core domain types and logic.

pub mod config_validation;
pub mod crossover;
pub mod ema;
pub mod error;
pub mod ledger;
pub mod price_bar;
pub mod session;
pub mod summary;

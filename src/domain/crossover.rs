//! Price/EMA crossover detection.
//!
//! Walks bars in ascending time order, feeding each close into the EMA and
//! tracking the sign of (close - ema). A sign change emits an event. Strictly
//! causal: each event is decided from bars seen so far, never ahead.
//!
//! Boundary convention: a diff of exactly zero can complete a cross
//! (`>=` / `<=`) but never starts one, so zero-to-zero transitions are silent.

use chrono::NaiveDateTime;

use super::ema::Ema;
use super::price_bar::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Buy,
    Sell,
}

/// A crossover with the close price and timestamp of the bar that fired it.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverEvent {
    pub direction: Crossover,
    pub price: f64,
    pub timestamp: NaiveDateTime,
}

/// Lazy iterator over crossover events in an ordered bar sequence.
pub struct CrossoverDetector<'a> {
    bars: std::slice::Iter<'a, PriceBar>,
    ema: Ema,
    prev_diff: Option<f64>,
}

impl<'a> CrossoverDetector<'a> {
    /// `bars` must already be sorted ascending by timestamp.
    pub fn new(bars: &'a [PriceBar], ema: Ema) -> Self {
        CrossoverDetector {
            bars: bars.iter(),
            ema,
            prev_diff: None,
        }
    }
}

impl Iterator for CrossoverDetector<'_> {
    type Item = CrossoverEvent;

    fn next(&mut self) -> Option<CrossoverEvent> {
        for bar in self.bars.by_ref() {
            self.ema.update(bar.close);
            let Some(ema) = self.ema.value() else {
                continue;
            };

            let diff = bar.close - ema;
            let prev = self.prev_diff.replace(diff);

            let Some(prev) = prev else {
                continue;
            };

            if prev < 0.0 && diff >= 0.0 {
                return Some(CrossoverEvent {
                    direction: Crossover::Buy,
                    price: bar.close,
                    timestamp: bar.timestamp,
                });
            }
            if prev > 0.0 && diff <= 0.0 {
                return Some(CrossoverEvent {
                    direction: Crossover::Sell,
                    price: bar.close,
                    timestamp: bar.timestamp,
                });
            }
        }
        None
    }
}

//! Exponential moving average state.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Not ready until seeded.

/// Running EMA over a close-price stream. Mutated in place by [`Ema::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    smoothing: f64,
    current: f64,
    seed_sum: f64,
    count: usize,
}

impl Ema {
    /// A fresh, unseeded EMA. `period` must be at least 1.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be at least 1");
        Ema {
            period,
            smoothing: 2.0 / (period as f64 + 1.0),
            current: 0.0,
            seed_sum: 0.0,
            count: 0,
        }
    }

    /// An already-seeded EMA with an explicit smoothing factor in (0, 1].
    /// Used to warm-start a session from a known state.
    pub fn with_state(period: usize, smoothing: f64, current: f64) -> Self {
        assert!(period >= 1, "EMA period must be at least 1");
        assert!(
            smoothing > 0.0 && smoothing <= 1.0,
            "smoothing must be in (0, 1]"
        );
        Ema {
            period,
            smoothing,
            current,
            seed_sum: 0.0,
            count: period,
        }
    }

    /// Consume one close. Accumulates toward the SMA seed until ready,
    /// then applies the standard recursion.
    pub fn update(&mut self, close: f64) {
        if self.count < self.period {
            self.seed_sum += close;
            self.count += 1;
            if self.count == self.period {
                self.current = self.seed_sum / self.period as f64;
            }
        } else {
            self.current = close * self.smoothing + self.current * (1.0 - self.smoothing);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    /// Current EMA value once enough closes have been consumed.
    pub fn value(&self) -> Option<f64> {
        if self.is_ready() {
            Some(self.current)
        } else {
            None
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn feed(ema: &mut Ema, closes: &[f64]) {
        for &c in closes {
            ema.update(c);
        }
    }

    #[test]
    fn warmup_until_period_bars() {
        let mut ema = Ema::new(3);
        ema.update(10.0);
        assert!(!ema.is_ready());
        ema.update(20.0);
        assert!(!ema.is_ready());
        ema.update(30.0);
        assert!(ema.is_ready());
    }

    #[test]
    fn seed_is_sma() {
        let mut ema = Ema::new(3);
        feed(&mut ema, &[10.0, 20.0, 30.0]);
        assert_relative_eq!(ema.value().unwrap(), 20.0);
    }

    #[test]
    fn period_1_tracks_last_close() {
        let mut ema = Ema::new(1);
        ema.update(10.0);
        assert!(ema.is_ready());
        assert_relative_eq!(ema.value().unwrap(), 10.0);
        ema.update(20.0);
        assert_relative_eq!(ema.value().unwrap(), 20.0);
    }

    #[test]
    fn recursion_after_seed() {
        let mut ema = Ema::new(3);
        feed(&mut ema, &[10.0, 20.0, 30.0, 40.0, 50.0]);

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);
        assert_relative_eq!(ema.value().unwrap(), ema_4);
    }

    #[test]
    fn constant_prices_stay_constant() {
        let mut ema = Ema::new(3);
        feed(&mut ema, &[100.0; 10]);
        assert_relative_eq!(ema.value().unwrap(), 100.0);
    }

    #[test]
    fn value_none_before_ready() {
        let mut ema = Ema::new(5);
        feed(&mut ema, &[1.0, 2.0, 3.0]);
        assert_eq!(ema.value(), None);
    }

    #[test]
    fn with_state_is_ready_immediately() {
        let mut ema = Ema::with_state(1, 0.5, 10.0);
        assert!(ema.is_ready());
        assert_relative_eq!(ema.value().unwrap(), 10.0);
        ema.update(20.0);
        assert_relative_eq!(ema.value().unwrap(), 15.0);
    }

    #[test]
    fn same_prefix_same_value() {
        let closes = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let mut a = Ema::new(4);
        let mut b = Ema::new(4);
        feed(&mut a, &closes);
        feed(&mut b, &closes);
        assert_eq!(a.value(), b.value());
    }

    #[test]
    #[should_panic]
    fn period_0_rejected() {
        Ema::new(0);
    }
}

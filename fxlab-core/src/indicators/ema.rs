//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * mid[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: EMA[0] = mid[0]. No SMA warmup window, so there is no NaN prefix.

#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    alpha: f64,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
        }
    }

    pub fn name(&self) -> String {
        format!("ema_{}", self.period)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Value at the first bar.
    pub fn seed(&self, price: f64) -> f64 {
        price
    }

    /// Advance one bar from the previous EMA value.
    pub fn step(&self, prev: f64, price: f64) -> f64 {
        self.alpha * price + (1.0 - self.alpha) * prev
    }
}

/// EMA over a pre-extracted series. Empty in, empty out.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let ema = Ema::new(period);
    let mut result = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    if let Some(&first) = iter.next() {
        let mut prev = ema.seed(first);
        result.push(prev);
        for &v in iter {
            prev = ema.step(prev, v);
            result.push(prev);
        }
    }
    result
}

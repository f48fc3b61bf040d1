//! G-Channel: a self-damping price envelope.
//!
//! Two running values, seeded at the first price:
//! - Upper: a[t] = max(p[t], a[t-1]) - (a[t-1] - b[t-1]) / length
//! - Lower: b[t] = min(p[t], b[t-1]) + (a[t-1] - b[t-1]) / length
//!
//! Both updates read the previous bar's bands. The upper band rides above price,
//! the lower band below, and both decay toward price at rate 1/length.

use serde::{Deserialize, Serialize};

/// Band values after a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelState {
    pub upper: f64,
    pub lower: f64,
}

impl ChannelState {
    pub fn mid(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GChannel {
    length: usize,
}

impl GChannel {
    pub fn new(length: usize) -> Self {
        assert!(length >= 1, "G-Channel length must be >= 1");
        Self { length }
    }

    pub fn name(&self) -> String {
        format!("gchannel_{}", self.length)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Both bands start at the first price.
    pub fn seed(&self, price: f64) -> ChannelState {
        ChannelState {
            upper: price,
            lower: price,
        }
    }

    /// Advance one bar.
    pub fn step(&self, prev: ChannelState, price: f64) -> ChannelState {
        let decay = prev.width() / self.length as f64;
        ChannelState {
            upper: price.max(prev.upper) - decay,
            lower: price.min(prev.lower) + decay,
        }
    }
}

//! Indicator engine: EMA and G-Channel computed in one forward pass.
//!
//! Both indicators are recurrences, so the engine is written as an explicit fold:
//! `(IndicatorState, mid) -> (IndicatorState, IndicatorFrame)`. Frames are
//! precomputed once before the bar loop and looked up by bar index.
//!
//! Because every frame depends only on the carried state and the current mid,
//! a series may be computed in consecutive chunks as long as the state at the
//! end of one chunk seeds the next. The result is bit-identical to a single pass.

pub mod ema;
pub mod gchannel;

pub use ema::{ema_of_series, Ema};
pub use gchannel::{ChannelState, GChannel};

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Derived values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub ema: f64,
    pub channel_upper: f64,
    pub channel_lower: f64,
    pub channel_mid: f64,
}

/// Everything the recurrence carries from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorState {
    pub ema: f64,
    pub channel: ChannelState,
}

impl IndicatorState {
    pub fn frame(&self) -> IndicatorFrame {
        IndicatorFrame {
            ema: self.ema,
            channel_upper: self.channel.upper,
            channel_lower: self.channel.lower,
            channel_mid: self.channel.mid(),
        }
    }
}

/// EMA + G-Channel with fixed parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorEngine {
    ema: Ema,
    channel: GChannel,
}

impl IndicatorEngine {
    pub fn new(ema_period: usize, channel_length: usize) -> Self {
        Self {
            ema: Ema::new(ema_period),
            channel: GChannel::new(channel_length),
        }
    }

    pub fn ema(&self) -> &Ema {
        &self.ema
    }

    pub fn channel(&self) -> &GChannel {
        &self.channel
    }

    /// State and frame at the first bar.
    pub fn seed(&self, mid: f64) -> (IndicatorState, IndicatorFrame) {
        let state = IndicatorState {
            ema: self.ema.seed(mid),
            channel: self.channel.seed(mid),
        };
        (state, state.frame())
    }

    /// One recurrence step.
    pub fn step(&self, prev: IndicatorState, mid: f64) -> (IndicatorState, IndicatorFrame) {
        let state = IndicatorState {
            ema: self.ema.step(prev.ema, mid),
            channel: self.channel.step(prev.channel, mid),
        };
        (state, state.frame())
    }

    /// Frames for a whole series of mid prices.
    pub fn compute(&self, mids: &[f64]) -> Vec<IndicatorFrame> {
        self.compute_from(None, mids).0
    }

    /// Frames for a chunk, continuing from `carried` when it is the tail of a
    /// previous chunk. `None` means `mids[0]` is the first bar of the series.
    ///
    /// Returns the frames and the state after the last bar (None for an empty
    /// chunk with no carried state).
    pub fn compute_from(
        &self,
        carried: Option<IndicatorState>,
        mids: &[f64],
    ) -> (Vec<IndicatorFrame>, Option<IndicatorState>) {
        let mut frames = Vec::with_capacity(mids.len());
        let mut state = carried;
        for &mid in mids {
            let (next, frame) = match state {
                None => self.seed(mid),
                Some(prev) => self.step(prev, mid),
            };
            frames.push(frame);
            state = Some(next);
        }
        (frames, state)
    }

    /// Frames for a bar series, driven by the mid price.
    pub fn compute_bars(&self, bars: &[Bar]) -> Vec<IndicatorFrame> {
        let mids: Vec<f64> = bars.iter().map(|b| b.mid).collect();
        self.compute(&mids)
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

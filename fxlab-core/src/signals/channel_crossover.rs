//! Channel crossover signal: mid price crossing the G-Channel midline.
//!
//! Fires EnterLong when mid crosses above channel_mid.
//! Fires EnterShort when mid crosses below channel_mid.
//! The EMA is carried in the frame but does not gate entries.

use crate::domain::Bar;
use crate::indicators::IndicatorFrame;

use super::{Signal, SignalGenerator};

#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCrossover;

impl ChannelCrossover {
    pub fn new() -> Self {
        Self
    }
}

impl SignalGenerator for ChannelCrossover {
    fn name(&self) -> &str {
        "channel_crossover"
    }

    fn evaluate(&self, bars: &[Bar], frames: &[IndicatorFrame], bar_index: usize) -> Signal {
        // Need the previous bar to detect a crossing.
        if bar_index == 0 || bar_index >= bars.len() || bar_index >= frames.len() {
            return Signal::None;
        }

        let mid_cur = bars[bar_index].mid;
        let mid_prev = bars[bar_index - 1].mid;
        let ch_cur = frames[bar_index].channel_mid;
        let ch_prev = frames[bar_index - 1].channel_mid;

        // Upward cross. Current: mid > channel. Previous: mid <= channel.
        if mid_cur > ch_cur && mid_prev <= ch_prev {
            return Signal::EnterLong;
        }

        // Downward cross. Current: mid < channel. Previous: mid >= channel.
        if mid_cur < ch_cur && mid_prev >= ch_prev {
            return Signal::EnterShort;
        }

        Signal::None
    }
}

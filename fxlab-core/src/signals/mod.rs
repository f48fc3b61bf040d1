//! Signal generation: discrete entry intent from market data only.
//!
//! Signals never see position or balance state. They describe a market event
//! (a crossing), not a trading decision; the position manager decides whether
//! to act on it.

pub mod channel_crossover;

pub use channel_crossover::ChannelCrossover;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::IndicatorFrame;

/// Per-bar entry signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    #[default]
    None,
    EnterLong,
    EnterShort,
}

impl Signal {
    pub fn is_entry(&self) -> bool {
        !matches!(self, Signal::None)
    }
}

/// Trait for signal generators.
///
/// # Architecture invariant
/// `evaluate` receives bar history and precomputed indicator frames, nothing
/// else. It must only read `bars[..=bar_index]` and `frames[..=bar_index]`.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "channel_crossover").
    fn name(&self) -> &str;

    /// Signal at `bar_index`. `bars` and `frames` are the same length.
    fn evaluate(&self, bars: &[Bar], frames: &[IndicatorFrame], bar_index: usize) -> Signal;
}

/// Evaluate `generator` on every bar of the series.
pub fn generate_signals(
    generator: &dyn SignalGenerator,
    bars: &[Bar],
    frames: &[IndicatorFrame],
) -> Vec<Signal> {
    (0..bars.len())
        .map(|i| generator.evaluate(bars, frames, i))
        .collect()
}

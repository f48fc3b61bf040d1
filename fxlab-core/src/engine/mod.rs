//! Backtesting engine: single-instrument, bar-by-bar.
//!
//! The engine consumes a validated price series, precomputes indicator frames
//! in one forward pass, then walks the bars in timestamp order driving the
//! position manager. Strictly sequential: every step depends on the state
//! left by the previous bar.

pub mod loop_runner;
pub mod state;

pub use loop_runner::{run_backtest, run_series, BacktestError};
pub use state::{BacktestState, RunOutput};

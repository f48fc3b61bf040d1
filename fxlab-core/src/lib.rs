//! FXLab Core: single-instrument backtesting engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, validated price series, positions, trades)
//! - EMA and G-Channel indicators as an explicit recurrence fold
//! - Channel crossover signal rule
//! - Position manager state machine with take-profit / stop-loss exits
//! - Bar-by-bar engine loop producing a trade ledger
//! - Config validation and the input/config error taxonomy
//!
//! The engine is a pure function of (bars, config). Where the bars came from
//! is not its concern.

pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod position_management;
pub mod signals;

pub use config::{BacktestConfig, ConfigError};
pub use engine::{run_backtest, run_series, BacktestError, RunOutput};

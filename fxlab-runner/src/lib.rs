//! FXLab Runner: backtest orchestration, bar sources, reports, export.
//!
//! This crate builds on `fxlab-core` to provide:
//! - TOML run configs (engine parameters plus a bar source)
//! - Bar sources: CSV file, JSON over HTTP, seeded synthetic walk
//! - Single-run orchestration with fingerprinting
//! - Summary statistics and the realized equity curve
//! - JSON / CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod report;
pub mod runner;

pub use config::{ConfigFileError, DataConfig, RunConfig, SyntheticConfig};
pub use data_loader::{
    load_bars, BarSource, CsvBarSource, HttpJsonBarSource, LoadError, SyntheticBarSource,
};
pub use export::{
    export_equity_csv, export_json, export_trades_csv, format_summary, import_json,
    load_artifacts, save_artifacts,
};
pub use metrics::Summary;
pub use report::{EquityPoint, Report, ReportBuilder};
pub use runner::{run_backtest_from_bars, run_from_config, BacktestResult, RunError};

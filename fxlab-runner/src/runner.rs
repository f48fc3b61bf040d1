//! Backtest runner: wires bar sources, the engine, and reporting together.
//!
//! Two entry points:
//! - `run_from_config()`: loads bars from the configured source, then runs. Used by the CLI.
//! - `run_backtest_from_bars()`: takes pre-loaded bars. No I/O.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fxlab_core::domain::{Bar, Trade};
use fxlab_core::engine::{run_backtest, BacktestError};
use fxlab_core::fingerprint::RunFingerprint;
use fxlab_core::BacktestConfig;

use crate::config::{ConfigFileError, RunConfig};
use crate::data_loader::{load_bars, LoadError};
use crate::metrics::Summary;
use crate::report::{EquityPoint, ReportBuilder};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error(transparent)]
    Backtest(#[from] BacktestError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trades: Vec<Trade>,
    pub summary: Summary,
    pub equity_curve: Vec<EquityPoint>,
    pub fingerprint: RunFingerprint,
    pub config: BacktestConfig,
    /// Name of the bar source (e.g., "csv:data/eurusd.csv").
    pub source: String,
    pub signal_count: usize,
    pub bar_count: usize,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn run_id(&self) -> String {
        self.fingerprint.run_id()
    }
}

/// Load bars from the configured source and run.
///
/// Relative CSV paths resolve against `base_dir` (usually the config file's
/// directory).
pub fn run_from_config(
    run: &RunConfig,
    base_dir: Option<&Path>,
) -> Result<BacktestResult, RunError> {
    run.validate()?;
    let source = run.data.source(base_dir)?;
    let bars = load_bars(source.as_ref())?;
    run_backtest_from_bars(&bars, &run.backtest, source.name())
}

/// Run on pre-loaded bars: no I/O.
pub fn run_backtest_from_bars(
    bars: &[Bar],
    config: &BacktestConfig,
    source: &str,
) -> Result<BacktestResult, RunError> {
    let output = run_backtest(bars, config)?;

    // A successful run guarantees at least two bars.
    let start = bars[0].timestamp;
    let report = ReportBuilder::new(config.initial_balance, start).build(&output.ledger);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        initial_balance: config.initial_balance,
        final_balance: output.final_balance,
        trades: output.ledger,
        summary: report.summary,
        equity_curve: report.equity_curve,
        fingerprint: RunFingerprint::new(config, bars),
        config: config.clone(),
        source: source.to_string(),
        signal_count: output.signal_count,
        bar_count: output.bar_count,
    })
}

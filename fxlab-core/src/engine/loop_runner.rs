//! Bar-by-bar loop: the heart of the backtesting engine.
//!
//! Bar 0 seeds the indicators and is never traded. For each later bar:
//! 1. Look up the precomputed indicator frame
//! 2. Evaluate the entry signal
//! 3. Drive the position manager (exits first, then entries)
//!
//! After the last bar an open position is force-closed with `end_of_data`.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{BacktestConfig, ConfigError};
use crate::domain::{Bar, InputError, PriceSeries};
use crate::indicators::IndicatorEngine;
use crate::position_management::PositionManager;
use crate::signals::{ChannelCrossover, SignalGenerator};

use super::state::{BacktestState, RunOutput};

/// Why a run was refused. Both kinds are raised before any state is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

/// Validate raw bars and config, then run with the channel crossover rule.
pub fn run_backtest(bars: &[Bar], config: &BacktestConfig) -> Result<RunOutput, BacktestError> {
    config.validate()?;
    let series = PriceSeries::new(bars.to_vec())?;
    run_series(&series, config, &ChannelCrossover)
}

/// Run on an already-validated series with any signal rule.
pub fn run_series(
    series: &PriceSeries,
    config: &BacktestConfig,
    signal_generator: &dyn SignalGenerator,
) -> Result<RunOutput, BacktestError> {
    config.validate()?;

    let bars = series.bars();
    let last = bars.len() - 1;

    let engine = IndicatorEngine::new(config.ema_period, config.channel_length);
    let frames = engine.compute_bars(bars);
    let pm = PositionManager::from_config(config);

    let mut state = BacktestState::new(config.initial_balance);
    let mut signal_count = 0;

    for (t, bar) in bars.iter().enumerate().skip(1) {
        let signal = signal_generator.evaluate(bars, &frames, t);
        if signal.is_entry() {
            signal_count += 1;
        }
        pm.on_bar(&mut state, t, bar, signal, t < last);
        state.debug_check();
    }

    if let Some(trade) = pm.close_at_end(&mut state, last, &bars[last]) {
        warn!(
            entry_bar = trade.entry_bar,
            exit_price = trade.exit_price,
            pnl = trade.pnl,
            "position still open at end of data, force-closed"
        );
    }
    state.debug_check();

    info!(
        bars = bars.len(),
        signals = signal_count,
        trades = state.ledger.len(),
        final_balance = state.balance,
        signal = signal_generator.name(),
        pm = pm.name(),
        "backtest complete"
    );

    Ok(RunOutput {
        final_balance: state.balance,
        ledger: state.ledger,
        frames,
        signal_count,
        positions_opened: state.positions_opened,
        bar_count: bars.len(),
    })
}

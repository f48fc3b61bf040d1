//! Backtest configuration and its validation.
//!
//! Every field has a default, so a partial TOML/JSON table deserializes into a
//! complete config. Defaults never stand in for invalid values: `validate()`
//! rejects anything out of range and the engine refuses to run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration. Raised before the run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be > 0, got {value}")]
    ZeroLength { field: &'static str, value: usize },

    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },
}

impl ConfigError {
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::ZeroLength { field, .. }
            | ConfigError::NotPositive { field, .. }
            | ConfigError::Negative { field, .. } => field,
        }
    }
}

/// Parameters for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestConfig {
    /// EMA period N (alpha = 2 / (N + 1)).
    pub ema_period: usize,
    /// G-Channel length L.
    pub channel_length: usize,
    /// Fixed position size in units of the instrument.
    pub trade_amount: f64,
    /// Close when unrealized P&L reaches this amount.
    pub take_profit_threshold: f64,
    /// Close when unrealized P&L falls to minus this amount.
    pub stop_loss_threshold: f64,
    pub initial_balance: f64,
    /// Flat fee charged once per closed trade.
    pub fee_per_trade: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            ema_period: 200,
            channel_length: 10,
            trade_amount: 5000.0,
            take_profit_threshold: 1.0,
            stop_loss_threshold: 250.0,
            initial_balance: 10_000.0,
            fee_per_trade: 0.0,
        }
    }
}

impl BacktestConfig {
    /// Check every field. Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_len("ema_period", self.ema_period)?;
        positive_len("channel_length", self.channel_length)?;
        positive("trade_amount", self.trade_amount)?;
        positive("take_profit_threshold", self.take_profit_threshold)?;
        positive("stop_loss_threshold", self.stop_loss_threshold)?;
        positive("initial_balance", self.initial_balance)?;
        non_negative("fee_per_trade", self.fee_per_trade)?;
        Ok(())
    }
}

fn positive_len(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroLength { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

//! Run fingerprinting: deterministic identity of a config and a dataset.
//!
//! - `config_hash`: every `BacktestConfig` field, in declaration order.
//! - `dataset_hash`: every bar's timestamp and prices, in series order.
//!
//! Two runs with equal fingerprints are guaranteed to produce equal ledgers,
//! since the engine is a pure function of (bars, config).

use serde::{Deserialize, Serialize};

use crate::config::BacktestConfig;
use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub config_hash: String,
    pub dataset_hash: String,
}

impl RunFingerprint {
    pub fn new(config: &BacktestConfig, bars: &[Bar]) -> Self {
        Self {
            config_hash: config_hash(config),
            dataset_hash: dataset_hash(bars),
        }
    }

    /// Combined identity of the run.
    pub fn run_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config_hash.as_bytes());
        hasher.update(self.dataset_hash.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

pub fn config_hash(config: &BacktestConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(config.ema_period as u64).to_le_bytes());
    hasher.update(&(config.channel_length as u64).to_le_bytes());
    for v in [
        config.trade_amount,
        config.take_profit_threshold,
        config.stop_loss_threshold,
        config.initial_balance,
        config.fee_per_trade,
    ] {
        hasher.update(&v.to_bits().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(bars.len() as u64).to_le_bytes());
    for bar in bars {
        hasher.update(&bar.timestamp.timestamp_micros().to_le_bytes());
        hasher.update(&bar.bid.to_bits().to_le_bytes());
        hasher.update(&bar.ask.to_bits().to_le_bytes());
        hasher.update(&bar.mid.to_bits().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

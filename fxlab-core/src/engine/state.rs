//! Mutable run state and the run output.

use serde::{Deserialize, Serialize};

use crate::domain::{PositionState, Trade};
use crate::indicators::IndicatorFrame;

/// State that evolves bar-by-bar. One writer: the engine loop, through
/// [`PositionManager`](crate::position_management::PositionManager).
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestState {
    pub balance: f64,
    pub position: PositionState,
    /// Append-only.
    pub ledger: Vec<Trade>,
    pub positions_opened: usize,
}

impl BacktestState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            position: PositionState::Flat,
            ledger: Vec::new(),
            positions_opened: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_flat()
    }

    /// Positions opened minus positions closed: 0 when flat, 1 when open.
    pub fn open_count(&self) -> usize {
        self.positions_opened - self.ledger.len()
    }

    /// Debug check of the single-position invariant after a bar.
    pub fn debug_check(&self) {
        debug_assert!(
            self.open_count() == usize::from(!self.is_flat()),
            "position bookkeeping violated: opened={}, closed={}, flat={}",
            self.positions_opened,
            self.ledger.len(),
            self.is_flat()
        );
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub final_balance: f64,
    /// Closed trades in chronological order.
    pub ledger: Vec<Trade>,
    /// One frame per input bar. The EMA column is diagnostic only.
    pub frames: Vec<IndicatorFrame>,
    /// Entry signals emitted, acted on or not.
    pub signal_count: usize,
    pub positions_opened: usize,
    pub bar_count: usize,
}

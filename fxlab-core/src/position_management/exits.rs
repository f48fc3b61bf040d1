//! Exit rules on unrealized P&L.

use serde::{Deserialize, Serialize};

use crate::domain::CloseReason;

/// Fixed money thresholds. Take-profit is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitRules {
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl ExitRules {
    pub fn new(take_profit: f64, stop_loss: f64) -> Self {
        Self {
            take_profit,
            stop_loss,
        }
    }

    /// Exit reason for an unrealized P&L, if either threshold is reached.
    pub fn check(&self, unrealized_pnl: f64) -> Option<CloseReason> {
        if unrealized_pnl >= self.take_profit {
            Some(CloseReason::TakeProfit)
        } else if unrealized_pnl <= -self.stop_loss {
            Some(CloseReason::StopLoss)
        } else {
            None
        }
    }
}

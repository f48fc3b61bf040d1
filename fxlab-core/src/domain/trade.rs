//! Trade: a completed round trip, entry to exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::{Position, PositionSide};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    TakeProfit,
    StopLoss,
    EndOfData,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::TakeProfit => "take_profit",
            CloseReason::StopLoss => "stop_loss",
            CloseReason::EndOfData => "end_of_data",
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable ledger entry for a closed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: PositionSide,
    pub size: f64,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub reason: CloseReason,

    // ── PnL ──
    pub gross_pnl: f64,
    pub fee: f64,
    /// Realized P&L credited to the balance: `gross_pnl - fee`.
    pub pnl: f64,
}

impl Trade {
    /// Close `position` at `exit_price` on bar `exit_bar`.
    pub fn close(
        position: Position,
        exit_bar: usize,
        exit_time: DateTime<Utc>,
        exit_price: f64,
        fee: f64,
        reason: CloseReason,
    ) -> Self {
        let gross_pnl = position.pnl_at(exit_price);
        Self {
            side: position.side,
            size: position.size,
            entry_bar: position.entry_bar,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_bar,
            exit_time,
            exit_price,
            reason,
            gross_pnl,
            fee,
            pnl: gross_pnl - fee,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar - self.entry_bar
    }

    /// Return on the notional at entry, as a fraction.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_price * self.size;
        if notional == 0.0 {
            return 0.0;
        }
        self.pnl / notional
    }
}

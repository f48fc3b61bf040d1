//! Open position and the flat/open state it lives in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bar::{Bar, PriceField};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }

    /// Aggressor side used to enter: buy at the ask, sell at the bid.
    pub fn entry_field(&self) -> PriceField {
        match self {
            PositionSide::Long => PriceField::Ask,
            PositionSide::Short => PriceField::Bid,
        }
    }

    /// Opposite side used to close: a long sells at the bid, a short buys at the ask.
    pub fn exit_field(&self) -> PriceField {
        match self {
            PositionSide::Long => PriceField::Bid,
            PositionSide::Short => PriceField::Ask,
        }
    }
}

/// A live position. Fixed size, single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub size: f64,
}

impl Position {
    /// Open a position on `bar`, filling at the side's entry price.
    pub fn open(side: PositionSide, bar_index: usize, bar: &Bar, size: f64) -> Self {
        Self {
            side,
            entry_bar: bar_index,
            entry_time: bar.timestamp,
            entry_price: bar.price(side.entry_field()),
            size,
        }
    }

    pub fn is_long(&self) -> bool {
        self.side == PositionSide::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == PositionSide::Short
    }

    /// Price this position would close at on `bar`.
    pub fn exit_price(&self, bar: &Bar) -> f64 {
        bar.price(self.side.exit_field())
    }

    /// P&L if closed at `exit_price`.
    pub fn pnl_at(&self, exit_price: f64) -> f64 {
        (exit_price - self.entry_price) * self.side.sign() * self.size
    }

    /// Mark-to-market P&L against the close side of `bar`.
    pub fn unrealized_pnl(&self, bar: &Bar) -> f64 {
        self.pnl_at(self.exit_price(bar))
    }
}

/// Flat, or holding exactly one position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Open(Position),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(pos) => Some(pos),
        }
    }

    pub fn side(&self) -> Option<PositionSide> {
        self.position().map(|p| p.side)
    }

    /// Take the open position out, leaving the state flat.
    pub fn take(&mut self) -> Option<Position> {
        match std::mem::take(self) {
            PositionState::Flat => None,
            PositionState::Open(pos) => Some(pos),
        }
    }
}

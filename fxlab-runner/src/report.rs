//! Report building: ledger in, summary and equity curve out.
//!
//! The equity curve has one point for the starting balance (stamped with the
//! first bar's time) and one per closed trade (stamped with its exit time).
//! It is the realized balance only; open positions are never marked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fxlab_core::domain::Trade;

use crate::metrics::Summary;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub equity_curve: Vec<EquityPoint>,
}

impl Report {
    pub fn final_balance(&self) -> f64 {
        self.equity_curve.last().map_or(0.0, |p| p.balance)
    }
}

/// Aggregates a finished ledger. Pure; never touches engine state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportBuilder {
    initial_balance: f64,
    start: DateTime<Utc>,
}

impl ReportBuilder {
    pub fn new(initial_balance: f64, start: DateTime<Utc>) -> Self {
        Self {
            initial_balance,
            start,
        }
    }

    pub fn build(&self, trades: &[Trade]) -> Report {
        let equity_curve = self.equity_curve(trades);
        let balances: Vec<f64> = equity_curve.iter().map(|p| p.balance).collect();
        Report {
            summary: Summary::compute(trades, &balances),
            equity_curve,
        }
    }

    /// Running balance, accumulated in ledger order.
    pub fn equity_curve(&self, trades: &[Trade]) -> Vec<EquityPoint> {
        let mut curve = Vec::with_capacity(trades.len() + 1);
        let mut balance = self.initial_balance;
        curve.push(EquityPoint {
            timestamp: self.start,
            balance,
        });
        for t in trades {
            balance += t.pnl;
            curve.push(EquityPoint {
                timestamp: t.exit_time,
                balance,
            });
        }
        curve
    }
}

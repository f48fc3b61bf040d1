//! Performance metrics: pure functions that compute run statistics.
//!
//! Every metric is a pure function: trade ledger and/or equity values in,
//! scalar out. No dependencies on the runner, bar sources, or engine loop.

use serde::{Deserialize, Serialize};

use fxlab_core::domain::Trade;

/// Summary statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Fraction of trades with pnl > 0; 0 with no trades.
    pub win_rate: f64,
    pub total_pnl: f64,
    /// (final − initial) / initial.
    pub total_return: f64,
    pub total_return_pct: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    /// Most negative peak-to-trough move of the equity curve, as a fraction.
    pub max_drawdown: f64,
    pub max_consecutive_losses: usize,
    #[serde(default)]
    pub max_consecutive_wins: usize,
    pub total_fees: f64,
}

impl Summary {
    /// Compute all statistics from the ledger and the balance after each trade.
    ///
    /// `equity` starts with the initial balance and has one more entry than
    /// `trades`.
    pub fn compute(trades: &[Trade], equity: &[f64]) -> Self {
        let tr = total_return(equity);
        Self {
            total_trades: trades.len(),
            win_count: win_count(trades),
            loss_count: loss_count(trades),
            win_rate: win_rate(trades),
            total_pnl: total_pnl(trades),
            total_return: tr,
            total_return_pct: tr * 100.0,
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            profit_factor: profit_factor(trades),
            max_drawdown: max_drawdown(equity),
            max_consecutive_losses: max_consecutive_losses(trades),
            max_consecutive_wins: max_consecutive_wins(trades),
            total_fees: trades.iter().map(|t| t.fee).sum(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

pub fn win_count(trades: &[Trade]) -> usize {
    trades.iter().filter(|t| t.is_winner()).count()
}

/// Trades with pnl < 0. Break-even trades count as neither win nor loss.
pub fn loss_count(trades: &[Trade]) -> usize {
    trades.iter().filter(|t| t.pnl < 0.0).count()
}

/// Win rate: fraction of trades that were winners.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    win_count(trades) as f64 / trades.len() as f64
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[f64]) -> f64 {
    let (Some(&initial), Some(&last)) = (equity.first(), equity.last()) else {
        return 0.0;
    };
    if initial <= 0.0 {
        return 0.0;
    }
    (last - initial) / initial
}

/// Mean pnl of winning trades; 0 with no winners.
pub fn avg_win(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl))
}

/// Mean pnl of losing trades (negative); 0 with no losers.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.pnl < 0.0).map(|t| t.pnl))
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity never falls below a previous peak.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        peak = peak.max(eq);
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    longest_run(trades, |t| t.pnl < 0.0)
}

pub fn max_consecutive_wins(trades: &[Trade]) -> usize {
    longest_run(trades, Trade::is_winner)
}

fn longest_run(trades: &[Trade], pred: impl Fn(&Trade) -> bool) -> usize {
    let mut best = 0;
    let mut current = 0;
    for t in trades {
        if pred(t) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use fxlab_core::domain::{CloseReason, PositionSide};

    fn trade(pnl: f64) -> Trade {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Trade {
            side: PositionSide::Long,
            size: 1000.0,
            entry_bar: 1,
            entry_time: t0,
            entry_price: 1.0,
            exit_bar: 2,
            exit_time: t0 + Duration::minutes(1),
            exit_price: 1.0 + pnl / 1000.0,
            reason: CloseReason::EndOfData,
            gross_pnl: pnl,
            fee: 0.0,
            pnl,
        }
    }

    fn trades(pnls: &[f64]) -> Vec<Trade> {
        pnls.iter().map(|&p| trade(p)).collect()
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        let s = Summary::compute(&[], &[10_000.0]);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.total_return, 0.0);
        assert_eq!(s.profit_factor, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
    }

    #[test]
    fn counts_and_rates() {
        let t = trades(&[100.0, -50.0, 0.0, 200.0]);
        assert_eq!(win_count(&t), 2);
        assert_eq!(loss_count(&t), 1);
        assert_eq!(win_rate(&t), 0.5);
        assert_eq!(total_pnl(&t), 250.0);
        assert_eq!(avg_win(&t), 150.0);
        assert_eq!(avg_loss(&t), -50.0);
        assert_eq!(profit_factor(&t), 6.0);
    }

    #[test]
    fn profit_factor_caps_when_no_losses() {
        assert_eq!(profit_factor(&trades(&[10.0, 20.0])), 100.0);
        assert_eq!(profit_factor(&trades(&[0.0])), 0.0);
    }

    #[test]
    fn total_return_is_fractional() {
        assert!((total_return(&[10_000.0, 10_500.0, 11_000.0]) - 0.1).abs() < 1e-12);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn drawdown_from_peak() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((dd - (-0.25)).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
    }

    #[test]
    fn streaks() {
        let t = trades(&[-1.0, -2.0, 5.0, -1.0, -1.0, -1.0, 3.0, 4.0]);
        assert_eq!(max_consecutive_losses(&t), 3);
        assert_eq!(max_consecutive_wins(&t), 2);

        let equity: Vec<f64> = std::iter::once(100.0)
            .chain(t.iter().scan(100.0, |b, tr| {
                *b += tr.pnl;
                Some(*b)
            }))
            .collect();
        let s = Summary::compute(&t, &equity);
        assert_eq!(s.max_consecutive_losses, 3);
        assert_eq!(s.max_consecutive_wins, 2);
    }
}

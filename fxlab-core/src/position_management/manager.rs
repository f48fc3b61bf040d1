//! Position manager: the FLAT / LONG / SHORT state machine.
//!
//! Per bar, in order:
//! 1. If open: mark to market against the close side of the bar.
//! 2. Take-profit, then stop-loss. A close ends the bar (no entry on the same bar).
//! 3. If flat and entries are allowed: act on an entry signal.
//!
//! No pyramiding and no reversal: an entry signal while open is ignored.

use tracing::debug;

use crate::config::BacktestConfig;
use crate::domain::{Bar, CloseReason, Position, PositionSide, PositionState, Trade};
use crate::engine::state::BacktestState;
use crate::signals::Signal;

use super::exits::ExitRules;

/// What happened to the position on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAction {
    /// Flat, no entry taken.
    Idle,
    /// Open, no exit condition met.
    Hold,
    Opened(PositionSide),
    Closed(CloseReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionManager {
    exits: ExitRules,
    size: f64,
    fee: f64,
}

impl PositionManager {
    pub fn new(exits: ExitRules, size: f64, fee: f64) -> Self {
        Self { exits, size, fee }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(
            ExitRules::new(config.take_profit_threshold, config.stop_loss_threshold),
            config.trade_amount,
            config.fee_per_trade,
        )
    }

    pub fn name(&self) -> &str {
        "fixed_tp_sl"
    }

    pub fn exits(&self) -> &ExitRules {
        &self.exits
    }

    /// Drive the state machine for bar `index`.
    ///
    /// `allow_entry` is false on the final bar, where a new position could not
    /// be held past its entry time.
    pub fn on_bar(
        &self,
        state: &mut BacktestState,
        index: usize,
        bar: &Bar,
        signal: Signal,
        allow_entry: bool,
    ) -> BarAction {
        if let Some(pnl) = state.position.position().map(|p| p.unrealized_pnl(bar)) {
            return match self.exits.check(pnl) {
                Some(reason) => {
                    self.close(state, index, bar, reason);
                    BarAction::Closed(reason)
                }
                None => BarAction::Hold,
            };
        }

        if !allow_entry {
            return BarAction::Idle;
        }

        let side = match signal {
            Signal::None => return BarAction::Idle,
            Signal::EnterLong => PositionSide::Long,
            Signal::EnterShort => PositionSide::Short,
        };

        let pos = Position::open(side, index, bar, self.size);
        debug!(
            bar = index,
            side = ?side,
            price = pos.entry_price,
            size = pos.size,
            "position opened"
        );
        state.position = PositionState::Open(pos);
        state.positions_opened += 1;
        BarAction::Opened(side)
    }

    /// Force-close whatever is open against `bar` (the last bar of the series).
    pub fn close_at_end<'s>(
        &self,
        state: &'s mut BacktestState,
        index: usize,
        bar: &Bar,
    ) -> Option<&'s Trade> {
        if state.is_flat() {
            return None;
        }
        self.close(state, index, bar, CloseReason::EndOfData);
        state.ledger.last()
    }

    fn close(&self, state: &mut BacktestState, index: usize, bar: &Bar, reason: CloseReason) {
        let Some(pos) = state.position.take() else {
            return;
        };
        let exit_price = pos.exit_price(bar);
        let trade = Trade::close(pos, index, bar.timestamp, exit_price, self.fee, reason);
        debug!(
            bar = index,
            side = ?trade.side,
            entry = trade.entry_price,
            exit = trade.exit_price,
            pnl = trade.pnl,
            reason = %reason,
            "position closed"
        );
        state.balance += trade.pnl;
        state.ledger.push(trade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar_at(i: i64, mid: f64) -> Bar {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Bar::new(t0 + Duration::hours(i), mid - 0.01, mid + 0.01, mid)
    }

    fn pm() -> PositionManager {
        PositionManager::from_config(&BacktestConfig::default())
    }

    #[test]
    fn flat_without_signal_stays_idle() {
        let mut state = BacktestState::new(10_000.0);
        let action = pm().on_bar(&mut state, 1, &bar_at(1, 100.0), Signal::None, true);
        assert_eq!(action, BarAction::Idle);
        assert!(state.is_flat());
    }

    #[test]
    fn enter_long_fills_at_ask() {
        let mut state = BacktestState::new(10_000.0);
        let action = pm().on_bar(&mut state, 1, &bar_at(1, 105.0), Signal::EnterLong, true);
        assert_eq!(action, BarAction::Opened(PositionSide::Long));
        let pos = state.position.position().unwrap();
        assert_eq!(pos.entry_price, 105.01);
        assert_eq!(pos.size, 5000.0);
        assert_eq!(state.positions_opened, 1);
        assert_eq!(state.balance, 10_000.0);
    }

    #[test]
    fn enter_short_fills_at_bid() {
        let mut state = BacktestState::new(10_000.0);
        pm().on_bar(&mut state, 1, &bar_at(1, 105.0), Signal::EnterShort, true);
        assert_eq!(state.position.position().unwrap().entry_price, 104.99);
    }

    #[test]
    fn entry_suppressed_when_not_allowed() {
        let mut state = BacktestState::new(10_000.0);
        let action = pm().on_bar(&mut state, 4, &bar_at(4, 105.0), Signal::EnterLong, false);
        assert_eq!(action, BarAction::Idle);
        assert!(state.is_flat());
    }

    #[test]
    fn signal_while_open_is_ignored() {
        let mut state = BacktestState::new(10_000.0);
        let pm = pm();
        pm.on_bar(&mut state, 1, &bar_at(1, 100.0), Signal::EnterLong, true);
        // Same quote: loses the spread (-100), inside both thresholds.
        let action = pm.on_bar(&mut state, 2, &bar_at(2, 100.0), Signal::EnterShort, true);
        assert_eq!(action, BarAction::Hold);
        assert_eq!(state.position.side(), Some(PositionSide::Long));
        assert_eq!(state.positions_opened, 1);
    }

    #[test]
    fn take_profit_closes_and_credits_balance() {
        let mut state = BacktestState::new(10_000.0);
        let pm = pm();
        pm.on_bar(&mut state, 1, &bar_at(1, 105.0), Signal::EnterLong, true);
        let action = pm.on_bar(&mut state, 2, &bar_at(2, 110.0), Signal::None, true);
        assert_eq!(action, BarAction::Closed(CloseReason::TakeProfit));
        assert!(state.is_flat());
        let trade = &state.ledger[0];
        assert_eq!(trade.exit_price, 109.99);
        assert!((trade.pnl - (109.99 - 105.01) * 5000.0).abs() < 1e-6);
        assert!((state.balance - (10_000.0 + trade.pnl)).abs() < 1e-9);
    }

    #[test]
    fn close_skips_entry_on_same_bar() {
        let mut state = BacktestState::new(10_000.0);
        let pm = pm();
        pm.on_bar(&mut state, 1, &bar_at(1, 105.0), Signal::EnterLong, true);
        let action = pm.on_bar(&mut state, 2, &bar_at(2, 110.0), Signal::EnterShort, true);
        assert_eq!(action, BarAction::Closed(CloseReason::TakeProfit));
        assert!(state.is_flat());
        assert_eq!(state.positions_opened, 1);
    }

    #[test]
    fn stop_loss_closes_short() {
        let mut state = BacktestState::new(10_000.0);
        let pm = pm();
        pm.on_bar(&mut state, 1, &bar_at(1, 100.0), Signal::EnterShort, true);
        let action = pm.on_bar(&mut state, 2, &bar_at(2, 100.2), Signal::None, true);
        assert_eq!(action, BarAction::Closed(CloseReason::StopLoss));
        let trade = &state.ledger[0];
        assert!(trade.pnl <= -250.0);
        assert!((trade.exit_price - 100.21).abs() < 1e-9);
    }

    #[test]
    fn fee_is_deducted_from_realized_pnl() {
        let config = BacktestConfig {
            fee_per_trade: 7.5,
            ..Default::default()
        };
        let pm = PositionManager::from_config(&config);
        let mut state = BacktestState::new(10_000.0);
        pm.on_bar(&mut state, 1, &bar_at(1, 105.0), Signal::EnterLong, true);
        pm.on_bar(&mut state, 2, &bar_at(2, 110.0), Signal::None, true);
        let trade = &state.ledger[0];
        assert_eq!(trade.fee, 7.5);
        assert!((trade.pnl - (trade.gross_pnl - 7.5)).abs() < 1e-9);
        assert!((state.balance - (10_000.0 + trade.pnl)).abs() < 1e-9);
    }

    #[test]
    fn close_at_end_uses_opposite_side() {
        let mut state = BacktestState::new(10_000.0);
        let pm = pm();
        pm.on_bar(&mut state, 1, &bar_at(1, 105.0), Signal::EnterLong, true);
        let trade = pm.close_at_end(&mut state, 2, &bar_at(2, 105.0)).cloned().unwrap();
        assert_eq!(trade.reason, CloseReason::EndOfData);
        assert_eq!(trade.exit_price, 104.99);
        assert!(state.is_flat());
    }

    #[test]
    fn close_at_end_when_flat_is_noop() {
        let mut state = BacktestState::new(10_000.0);
        assert!(pm().close_at_end(&mut state, 3, &bar_at(3, 100.0)).is_none());
        assert!(state.ledger.is_empty());
    }
}

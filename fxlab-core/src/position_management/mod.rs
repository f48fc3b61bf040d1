//! Position management: one position at a time, fixed exits.
//!
//! **Module Structure:**
//! - `exits`: take-profit / stop-loss thresholds on unrealized P&L
//! - `manager`: the FLAT/LONG/SHORT state machine driven once per bar

pub mod exits;
pub mod manager;

pub use exits::ExitRules;
pub use manager::{BarAction, PositionManager};

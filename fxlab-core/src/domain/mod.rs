//! Domain types for FXLab

pub mod bar;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::{Bar, PriceField};
pub use position::{Position, PositionSide, PositionState};
pub use series::{validate_bars, InputError, PriceSeries, MIN_BARS};
pub use trade::{CloseReason, Trade};

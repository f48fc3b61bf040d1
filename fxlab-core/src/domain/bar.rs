//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quoted price bar for a single instrument at a single instant.
///
/// `ask >= mid >= bid` is expected of well-formed data but is not enforced:
/// the engine only requires every price to be positive and finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
}

/// Which quoted price of a bar a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Bid,
    Ask,
    Mid,
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceField::Bid => write!(f, "bid"),
            PriceField::Ask => write!(f, "ask"),
            PriceField::Mid => write!(f, "mid"),
        }
    }
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, bid: f64, ask: f64, mid: f64) -> Self {
        Self {
            timestamp,
            bid,
            ask,
            mid,
        }
    }

    /// Build a bar from a two-sided quote, deriving mid as the midpoint.
    pub fn from_quote(timestamp: DateTime<Utc>, bid: f64, ask: f64) -> Self {
        Self::new(timestamp, bid, ask, (bid + ask) / 2.0)
    }

    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Bid => self.bid,
            PriceField::Ask => self.ask,
            PriceField::Mid => self.mid,
        }
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// First price field that is NaN or infinite, if any.
    pub fn non_finite_field(&self) -> Option<PriceField> {
        [PriceField::Bid, PriceField::Ask, PriceField::Mid]
            .into_iter()
            .find(|&f| !self.price(f).is_finite())
    }

    /// First price field that is zero or negative, if any.
    pub fn non_positive_field(&self) -> Option<PriceField> {
        [PriceField::Bid, PriceField::Ask, PriceField::Mid]
            .into_iter()
            .find(|&f| self.price(f) <= 0.0)
    }

    /// True when every price is finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.non_finite_field().is_none() && self.non_positive_field().is_none()
    }
}

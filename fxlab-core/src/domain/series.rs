//! PriceSeries: a validated, time-ordered run of bars.

use serde::Serialize;
use thiserror::Error;

use super::bar::{Bar, PriceField};

/// Minimum bars for a backtest: one to seed indicators, one to trade on.
pub const MIN_BARS: usize = 2;

/// Bad input data. Raised before any engine state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("series has {len} bar(s), at least {MIN_BARS} required")]
    TooShort { len: usize },

    #[error("bar {index}: {field} is not finite ({value})")]
    NonFinitePrice {
        index: usize,
        field: PriceField,
        value: f64,
    },

    #[error("bar {index}: {field} must be positive, got {value}")]
    NonPositivePrice {
        index: usize,
        field: PriceField,
        value: f64,
    },

    #[error("bar {index}: timestamp is not after the previous bar's")]
    NonIncreasingTimestamp { index: usize },
}

impl InputError {
    /// Offending bar index, if the error is tied to one bar.
    pub fn index(&self) -> Option<usize> {
        match self {
            InputError::TooShort { .. } => None,
            InputError::NonFinitePrice { index, .. }
            | InputError::NonPositivePrice { index, .. }
            | InputError::NonIncreasingTimestamp { index } => Some(*index),
        }
    }
}

/// Bars that passed validation: at least [`MIN_BARS`] long, strictly increasing
/// timestamps, every price positive and finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, InputError> {
        validate_bars(&bars)?;
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a validated series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn mids(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.mid).collect()
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

/// Check a raw bar slice without taking ownership.
pub fn validate_bars(bars: &[Bar]) -> Result<(), InputError> {
    if bars.len() < MIN_BARS {
        return Err(InputError::TooShort { len: bars.len() });
    }

    for (index, bar) in bars.iter().enumerate() {
        if let Some(field) = bar.non_finite_field() {
            return Err(InputError::NonFinitePrice {
                index,
                field,
                value: bar.price(field),
            });
        }
        if let Some(field) = bar.non_positive_field() {
            return Err(InputError::NonPositivePrice {
                index,
                field,
                value: bar.price(field),
            });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(InputError::NonIncreasingTimestamp { index });
        }
    }

    Ok(())
}

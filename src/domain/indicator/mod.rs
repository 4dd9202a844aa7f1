//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every series has exactly one point per input bar. Points inside the warmup
//! window carry `value: None`; substitution of defaults happens later, in
//! [`crate::domain::indicator_engine`].

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use adx::calculate_adx;
pub use bollinger::calculate_bollinger;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<IndicatorValue>,
}

impl IndicatorPoint {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn simple(&self) -> Option<f64> {
        match self.value {
            Some(IndicatorValue::Simple(v)) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    /// The signal line warms up later than the MACD line itself.
    Macd { line: f64, signal: Option<f64> },
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

impl IndicatorValue {
    /// MACD line minus signal line, once the signal line exists.
    pub fn histogram(&self) -> Option<f64> {
        match *self {
            IndicatorValue::Macd {
                line,
                signal: Some(signal),
            } => Some(line - signal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Rsi(usize),
    Adx(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult: f64,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Series of the given length with every point still warming up.
    pub(crate) fn undefined(
        indicator_type: IndicatorType,
        timestamps: impl Iterator<Item = NaiveDateTime>,
    ) -> Self {
        IndicatorSeries {
            indicator_type,
            values: timestamps
                .map(|timestamp| IndicatorPoint {
                    timestamp,
                    value: None,
                })
                .collect(),
        }
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.is_valid()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult,
            } => write!(f, "BOLLINGER({},{})", period, stddev_mult),
        }
    }
}

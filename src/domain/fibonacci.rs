//! Fibonacci retracement levels over the whole analysis window.
//!
//! Levels are kept as an ordered list, not a map: [`FibonacciLevels::near_level`]
//! reports the *first* level within tolerance in declaration order, which is not
//! necessarily the closest one.

use crate::domain::indicator_engine::IndicatorRow;
use std::fmt;
use tracing::debug;

/// Relative distance under which a price counts as sitting on a level.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FibRatio {
    Zero,
    R236,
    R382,
    Half,
    R618,
    R786,
    One,
}

impl FibRatio {
    /// Declaration order; also the order proximity matching walks.
    pub const ALL: [FibRatio; 7] = [
        FibRatio::Zero,
        FibRatio::R236,
        FibRatio::R382,
        FibRatio::Half,
        FibRatio::R618,
        FibRatio::R786,
        FibRatio::One,
    ];

    pub fn ratio(self) -> f64 {
        match self {
            FibRatio::Zero => 0.0,
            FibRatio::R236 => 0.236,
            FibRatio::R382 => 0.382,
            FibRatio::Half => 0.5,
            FibRatio::R618 => 0.618,
            FibRatio::R786 => 0.786,
            FibRatio::One => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FibRatio::Zero => "fib_0.0",
            FibRatio::R236 => "fib_0.236",
            FibRatio::R382 => "fib_0.382",
            FibRatio::Half => "fib_0.5",
            FibRatio::R618 => "fib_0.618",
            FibRatio::R786 => "fib_0.786",
            FibRatio::One => "fib_1.0",
        }
    }
}

impl fmt::Display for FibRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FibonacciLevels {
    levels: [(FibRatio, f64); 7],
}

impl FibonacciLevels {
    /// Levels spanning `low..=high`. The end points are copied verbatim so
    /// that `fib_0.0 == low` and `fib_1.0 == high` hold exactly.
    pub fn from_range(high: f64, low: f64) -> Self {
        let diff = high - low;
        let levels = FibRatio::ALL.map(|r| {
            let price = match r {
                FibRatio::Zero => low,
                FibRatio::One => high,
                _ => low + diff * r.ratio(),
            };
            (r, price)
        });
        Self { levels }
    }

    /// Global max(high) / min(low) over every row; `None` for an empty window.
    pub fn from_rows(rows: &[IndicatorRow]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let high = rows.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max);
        let low = rows.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
        let levels = Self::from_range(high, low);
        debug!(high, low, "fibonacci levels computed");
        Some(levels)
    }

    pub fn level(&self, ratio: FibRatio) -> f64 {
        self.levels
            .iter()
            .find(|(r, _)| *r == ratio)
            .map(|(_, price)| *price)
            .unwrap_or(f64::NAN)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FibRatio, f64)> + '_ {
        self.levels.iter().copied()
    }

    pub fn high(&self) -> f64 {
        self.level(FibRatio::One)
    }

    pub fn low(&self) -> f64 {
        self.level(FibRatio::Zero)
    }

    /// First level (in declaration order) with `|price - level| / price < tolerance`.
    pub fn near_level(&self, price: f64, tolerance: f64) -> Option<FibRatio> {
        self.levels
            .iter()
            .find(|(_, level)| ((price - level).abs() / price) < tolerance)
            .map(|(r, _)| *r)
    }

    /// min of the 0.236/0.382/0.5 levels and max of the 0.618/0.786/1.0 levels.
    pub fn support_resistance(&self) -> (f64, f64) {
        let support = [FibRatio::R236, FibRatio::R382, FibRatio::Half]
            .iter()
            .map(|&r| self.level(r))
            .fold(f64::INFINITY, f64::min);
        let resistance = [FibRatio::R618, FibRatio::R786, FibRatio::One]
            .iter()
            .map(|&r| self.level(r))
            .fold(f64::NEG_INFINITY, f64::max);
        (support, resistance)
    }
}

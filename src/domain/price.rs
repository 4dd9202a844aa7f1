//! Price series representation.
//!
//! A feed delivers [`PricePoint`]s whose high/low bounds may be absent. The
//! indicator stage only works on [`PriceBar`]s, where both bounds are known.

use crate::domain::error::SignalError;
use chrono::NaiveDateTime;

/// Half-width of the synthetic high/low band the market feed produces.
pub const DEFAULT_BOUND_PCT: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: NaiveDateTime, price: f64) -> Self {
        Self {
            timestamp,
            price,
            high: None,
            low: None,
        }
    }

    /// Point with synthetic bounds at price*(1±pct).
    pub fn with_synthetic_bounds(timestamp: NaiveDateTime, price: f64, pct: f64) -> Self {
        Self {
            timestamp,
            price,
            high: Some(price * (1.0 + pct)),
            low: Some(price * (1.0 - pct)),
        }
    }

    pub fn bar(&self) -> Option<PriceBar> {
        Some(PriceBar {
            timestamp: self.timestamp,
            price: self.price,
            high: self.high?,
            low: self.low?,
        })
    }
}

/// A point with both bounds present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub high: f64,
    pub low: f64,
}

impl PriceBar {
    /// max(high - low, |high - prev_price|, |low - prev_price|)
    pub fn true_range(&self, prev_price: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_price).abs();
        let lc = (self.low - prev_price).abs();
        hl.max(hc).max(lc)
    }
}

/// Names of the bound columns absent from any point of the series.
pub fn missing_columns(points: &[PricePoint]) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if points.iter().any(|p| p.high.is_none()) {
        missing.push("high");
    }
    if points.iter().any(|p| p.low.is_none()) {
        missing.push("low");
    }
    missing
}

/// Rejects series whose timestamps are not strictly ascending.
pub fn validate_order(points: &[PricePoint]) -> Result<(), SignalError> {
    match points
        .windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
    {
        Some(i) => Err(SignalError::InvalidTimestamps { index: i + 1 }),
        None => Ok(()),
    }
}

/// A usable price is finite and strictly positive.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Rejects the first NaN, infinite, zero or negative price.
pub fn validate_prices(points: &[PricePoint]) -> Result<(), SignalError> {
    match points.iter().position(|p| !is_valid_price(p.price)) {
        Some(index) => Err(SignalError::InvalidPrice {
            index,
            value: points[index].price,
        }),
        None => Ok(()),
    }
}

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use coinsignal::domain::advisory::{Advice, AdvisoryRequest, StrategyNote};
use coinsignal::domain::error::SignalError;
pub use coinsignal::domain::price::PricePoint;
use coinsignal::ports::advisory_port::AdvisoryPort;
use coinsignal::ports::feed_port::PriceFeedPort;
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockFeed {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, coin: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(coin.to_string(), points);
        self
    }

    pub fn with_error(mut self, coin: &str, reason: &str) -> Self {
        self.errors.insert(coin.to_string(), reason.to_string());
        self
    }
}

impl PriceFeedPort for MockFeed {
    fn fetch_prices(&self, coin: &str) -> Result<Vec<PricePoint>, SignalError> {
        if let Some(reason) = self.errors.get(coin) {
            return Err(SignalError::Feed {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(coin).cloned().unwrap_or_default())
    }
}

/// Advisory provider returning a canned response and counting calls.
pub struct MockAdvisory {
    pub response: Result<Advice, String>,
    pub calls: Cell<usize>,
}

impl MockAdvisory {
    pub fn answering(advice: Advice) -> Self {
        Self {
            response: Ok(advice),
            calls: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl AdvisoryPort for MockAdvisory {
    fn advise(&self, _request: &AdvisoryRequest) -> Result<Advice, SignalError> {
        self.calls.set(self.calls.get() + 1);
        self.response.clone().map_err(|reason| SignalError::Advisory { reason })
    }
}

pub fn sample_advice() -> Advice {
    Advice {
        notes: vec![StrategyNote {
            trend: "Market is consolidating".into(),
            strategy: "Accumulate near support".into(),
            targets: vec![51_000.0, 53_000.0],
        }],
    }
}

pub fn day(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

/// Points with the feed's ±1% bounds.
pub fn make_points(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::with_synthetic_bounds(day(i), p, 0.01))
        .collect()
}

pub fn linear_prices(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// Oscillating series with a slow drift, long enough to warm up every indicator.
pub fn wave_prices(count: usize, base: f64, amplitude: f64) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            base + amplitude * (t * 0.35).sin() + 0.002 * base * t
        })
        .collect()
}

/// Climbs for `up` days, then falls for `down` days.
pub fn rise_then_fall(up: usize, down: usize, start: f64, step: f64) -> Vec<f64> {
    let peak = start + step * up as f64;
    let mut prices = linear_prices(up, start, step);
    prices.extend((0..down).map(|i| peak - step * 1.5 * i as f64));
    prices
}

pub fn write_feed_csv(dir: &Path, coin: &str, prices: &[f64]) {
    let mut content = String::from("timestamp,price\n");
    for (i, p) in prices.iter().enumerate() {
        content.push_str(&format!("{},{}\n", day(i).format("%Y-%m-%d"), p));
    }
    fs::write(dir.join(format!("{}.csv", coin)), content).unwrap();
}

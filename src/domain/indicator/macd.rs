//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! The line is defined from bar slow-1, the signal line from bar slow-1+signal-1.

use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries::undefined(indicator_type, bars.iter().map(|b| b.timestamp));
    }

    let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();
    let ema_fast = ema_of(&prices, fast);
    let ema_slow = ema_of(&prices, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The signal EMA only runs over the defined stretch of the MACD line.
    let first_defined = macd_line.iter().position(Option::is_some);
    let mut signal_line: Vec<Option<f64>> = vec![None; bars.len()];
    if let Some(start) = first_defined {
        let defined: Vec<f64> = macd_line[start..].iter().flatten().copied().collect();
        for (offset, value) in ema_of(&defined, signal_period).into_iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            timestamp: bar.timestamp,
            value: macd_line[i].map(|line| IndicatorValue::Macd {
                line,
                signal: signal_line[i],
            }),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[PriceBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    fn rising(n: usize) -> Vec<PriceBar> {
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_bars(&prices)
    }

    fn parts(point: &IndicatorPoint) -> (f64, Option<f64>) {
        match point.value {
            Some(IndicatorValue::Macd { line, signal }) => (line, signal),
            _ => panic!("Expected Macd value"),
        }
    }

    #[test]
    fn macd_line_warmup_default() {
        let series = calculate_macd_default(&rising(40));

        for i in 0..DEFAULT_SLOW - 1 {
            assert!(!series.values[i].is_valid(), "Index {} should be undefined", i);
        }
        assert!(series.values[DEFAULT_SLOW - 1].is_valid());
    }

    #[test]
    fn macd_signal_warmup_default() {
        let series = calculate_macd_default(&rising(40));
        let warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;

        let (_, signal) = parts(&series.values[warmup - 1]);
        assert!(signal.is_none());
        let (_, signal) = parts(&series.values[warmup]);
        assert!(signal.is_some());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let series = calculate_macd_default(&rising(40));

        for point in &series.values {
            if let Some(value) = point.value {
                if let (IndicatorValue::Macd { line, signal: Some(signal) }, Some(hist)) =
                    (value, value.histogram())
                {
                    assert!((hist - (line - signal)).abs() < f64::EPSILON);
                }
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]);
        let series = calculate_macd(&bars, 3, 5, 2);

        let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();
        let ema_fast = ema_of(&prices, 3);
        let ema_slow = ema_of(&prices, 5);

        for (i, point) in series.values.iter().enumerate().skip(4) {
            let (line, _) = parts(point);
            let expected = ema_fast[i].unwrap() - ema_slow[i].unwrap();
            assert!((line - expected).abs() < f64::EPSILON, "mismatch at {}", i);
        }
    }

    #[test]
    fn macd_signal_seeds_with_line_average() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]);
        let series = calculate_macd(&bars, 3, 5, 2);

        let (first, _) = parts(&series.values[4]);
        let (second, signal) = parts(&series.values[5]);
        assert!((signal.unwrap() - (first + second) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn macd_short_series_keeps_length() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let series = calculate_macd_default(&bars);
        assert_eq!(series.values.len(), 3);
        assert_eq!(series.valid_count(), 0);
    }

    #[test]
    fn macd_zero_period() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        assert_eq!(calculate_macd(&bars, 0, 26, 9).valid_count(), 0);
        assert_eq!(calculate_macd(&bars, 12, 0, 9).valid_count(), 0);
        assert_eq!(calculate_macd(&bars, 12, 26, 0).valid_count(), 0);
    }

    #[test]
    fn macd_indicator_type() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let series = calculate_macd(&bars, 5, 10, 3);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 5,
                slow: 10,
                signal: 3
            }
        );
    }

    #[test]
    fn macd_rising_prices_line_above_zero() {
        let series = calculate_macd_default(&rising(40));
        let (line, _) = parts(&series.values[39]);
        assert!(line > 0.0);
    }
}

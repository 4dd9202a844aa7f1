//! Indicator stage: price series in, one fully populated [`IndicatorRow`] per point out.
//!
//! Individual indicator series leave warmup bars undefined. This stage joins
//! them row by row and substitutes the [`IndicatorDefaults`] table for every
//! undefined or non-finite value, so downstream stages never see a gap.

use crate::domain::error::SignalError;
use crate::domain::indicator::{
    adx, bollinger, calculate_adx, calculate_bollinger, calculate_macd, calculate_rsi, macd, rsi,
    IndicatorSeries, IndicatorValue,
};
use crate::domain::price::{
    missing_columns, validate_order, validate_prices, PriceBar, PricePoint,
};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_stddev_mult: f64,
    pub adx_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_stddev_mult: bollinger::DEFAULT_STDDEV_MULT,
            adx_period: adx::DEFAULT_PERIOD,
        }
    }
}

/// Values substituted for undefined indicator outputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorDefaults {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_diff: f64,
    pub bb_high: f64,
    pub bb_low: f64,
    pub bb_mid: f64,
    pub adx: f64,
}

pub const DEFAULTS: IndicatorDefaults = IndicatorDefaults {
    rsi: 0.0,
    macd: 0.0,
    macd_signal: 0.0,
    macd_diff: 0.0,
    bb_high: 0.0,
    bb_low: 0.0,
    bb_mid: 0.0,
    adx: 20.0,
};

/// Undefined and non-finite values both fall back to `default`.
pub fn or_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_diff: f64,
    pub bb_high: f64,
    pub bb_low: f64,
    pub bb_mid: f64,
    pub adx: f64,
}

impl IndicatorRow {
    /// Row for `bar` with every indicator at its default.
    pub fn with_defaults(bar: &PriceBar) -> Self {
        Self {
            timestamp: bar.timestamp,
            price: bar.price,
            high: bar.high,
            low: bar.low,
            rsi: DEFAULTS.rsi,
            macd: DEFAULTS.macd,
            macd_signal: DEFAULTS.macd_signal,
            macd_diff: DEFAULTS.macd_diff,
            bb_high: DEFAULTS.bb_high,
            bb_low: DEFAULTS.bb_low,
            bb_mid: DEFAULTS.bb_mid,
            adx: DEFAULTS.adx,
        }
    }
}

/// Computes RSI, MACD, Bollinger Bands and ADX for every point.
///
/// Fails with [`SignalError::MissingColumns`] when any point lacks a high or
/// low bound, [`SignalError::InvalidTimestamps`] on out-of-order rows and
/// [`SignalError::InvalidPrice`] on a non-finite or non-positive price; the
/// caller's series is left untouched in every case. Output length always
/// equals input length.
pub fn compute_indicators(
    points: &[PricePoint],
    params: &IndicatorParams,
) -> Result<Vec<IndicatorRow>, SignalError> {
    let missing = missing_columns(points);
    if !missing.is_empty() {
        warn!(missing = ?missing, "price series lacks required columns; skipping indicators");
        return Err(SignalError::missing_columns(&missing));
    }
    validate_order(points)?;
    validate_prices(points)?;

    let bars: Vec<PriceBar> = points.iter().filter_map(PricePoint::bar).collect();

    let rsi = calculate_rsi(&bars, params.rsi_period);
    let macd = calculate_macd(&bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let bollinger = calculate_bollinger(
        &bars,
        params.bollinger_period,
        params.bollinger_stddev_mult,
    );
    let adx = calculate_adx(&bars, params.adx_period);

    for series in [&rsi, &macd, &bollinger, &adx] {
        log_warmup(series, bars.len());
    }

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut row = IndicatorRow::with_defaults(bar);
            row.rsi = or_default(rsi.values[i].simple(), DEFAULTS.rsi);
            row.adx = or_default(adx.values[i].simple(), DEFAULTS.adx);

            if let Some(value @ IndicatorValue::Macd { line, signal }) = macd.values[i].value {
                row.macd = or_default(Some(line), DEFAULTS.macd);
                row.macd_signal = or_default(signal, DEFAULTS.macd_signal);
                row.macd_diff = or_default(value.histogram(), DEFAULTS.macd_diff);
            }

            if let Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) = bollinger.values[i].value
            {
                row.bb_high = or_default(Some(upper), DEFAULTS.bb_high);
                row.bb_mid = or_default(Some(middle), DEFAULTS.bb_mid);
                row.bb_low = or_default(Some(lower), DEFAULTS.bb_low);
            }

            row
        })
        .collect();

    Ok(rows)
}

fn log_warmup(series: &IndicatorSeries, rows: usize) {
    let valid = series.valid_count();
    if valid == 0 && rows > 0 {
        warn!(
            indicator = %series.indicator_type,
            rows,
            "not enough rows for indicator lookback; using defaults"
        );
    } else {
        debug!(indicator = %series.indicator_type, rows, valid, "indicator computed");
    }
}

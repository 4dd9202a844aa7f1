//! ADX (Average Directional Index) indicator.
//!
//! Per bar i >= 1:
//! - TR  = max(H-L, |H-P[i-1]|, |L-P[i-1]|)
//! - +DM = H[i]-H[i-1] when it exceeds L[i-1]-L[i] and is positive, else 0
//! - -DM = L[i-1]-L[i] when it exceeds H[i]-H[i-1] and is positive, else 0
//!
//! TR, +DM and -DM are Wilder-summed over n bars (seed: plain sum of the
//! first n, then S = S - S/n + x). DX = 100·|+DI − −DI| / (+DI + −DI).
//! ADX seeds with the mean of the first n DX values and is Wilder-averaged
//! after that.
//!
//! Warmup: first 2n-1 bars are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_adx(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 * period {
        return IndicatorSeries::undefined(
            IndicatorType::Adx(period),
            bars.iter().map(|b| b.timestamp),
        );
    }

    let n = period as f64;
    let mut tr = vec![0.0; bars.len()];
    let mut plus_dm = vec![0.0; bars.len()];
    let mut minus_dm = vec![0.0; bars.len()];

    for i in 1..bars.len() {
        let (prev, bar) = (&bars[i - 1], &bars[i]);
        tr[i] = bar.true_range(prev.price);

        let up = bar.high - prev.high;
        let down = prev.low - bar.low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let mut dx: Vec<Option<f64>> = vec![None; bars.len()];
    let mut smooth_tr = tr[1..=period].iter().sum::<f64>();
    let mut smooth_plus = plus_dm[1..=period].iter().sum::<f64>();
    let mut smooth_minus = minus_dm[1..=period].iter().sum::<f64>();
    dx[period] = Some(directional_index(smooth_tr, smooth_plus, smooth_minus));

    for i in (period + 1)..bars.len() {
        smooth_tr = smooth_tr - smooth_tr / n + tr[i];
        smooth_plus = smooth_plus - smooth_plus / n + plus_dm[i];
        smooth_minus = smooth_minus - smooth_minus / n + minus_dm[i];
        dx[i] = Some(directional_index(smooth_tr, smooth_plus, smooth_minus));
    }

    let first_adx = 2 * period - 1;
    let mut adx = 0.0;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if i < first_adx {
            None
        } else {
            if i == first_adx {
                adx = dx[period..=first_adx].iter().flatten().sum::<f64>() / n;
            } else {
                adx = (adx * (n - 1.0) + dx[i].unwrap_or(0.0)) / n;
            }
            Some(IndicatorValue::Simple(adx))
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}

fn directional_index(smooth_tr: f64, smooth_plus: f64, smooth_minus: f64) -> f64 {
    if smooth_tr <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * smooth_plus / smooth_tr;
    let minus_di = 100.0 * smooth_minus / smooth_tr;
    let sum = plus_di + minus_di;
    if sum <= 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / sum
    }
}

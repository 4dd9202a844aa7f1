//! Exponential moving average, the smoothing step behind MACD.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) values are undefined.

/// EMA over an arbitrary value sequence; `None` until the SMA seed exists.
pub(crate) fn ema_of(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period - 1 {
            sum += v;
            out.push(None);
        } else if i == period - 1 {
            sum += v;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = v * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let out = ema_of(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(out.len(), 5);
        assert!(out[0].is_none());
        assert!(out[1].is_none());
        assert!(out[2..].iter().all(Option::is_some));
    }

    #[test]
    fn ema_period_1_tracks_input() {
        assert_eq!(
            ema_of(&[10.0, 20.0, 30.0], 1),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn ema_seed_is_sma() {
        let seed = ema_of(&[10.0, 20.0, 30.0], 3)[2].unwrap();
        assert!((seed - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let out = ema_of(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((out[3].unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((out[4].unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_shorter_than_period_stays_undefined() {
        assert_eq!(ema_of(&[10.0, 20.0], 5), vec![None, None]);
    }

    #[test]
    fn ema_period_0_is_undefined() {
        assert_eq!(ema_of(&[10.0, 20.0], 0), vec![None, None]);
    }
}

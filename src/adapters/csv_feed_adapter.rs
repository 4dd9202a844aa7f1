//! CSV file price feed adapter.

use crate::domain::error::SignalError;
use crate::domain::price::{is_valid_price, PricePoint};
use crate::ports::feed_port::PriceFeedPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Reads `{coin}.csv` from a directory, or one fixed file.
///
/// Columns are located by header name: `timestamp` and `price` are required,
/// `high` and `low` optional. When the bounds are absent and `bound_pct` is
/// set, they are synthesised around the price; otherwise points carry no
/// bounds and the indicator stage reports them missing.
pub struct CsvFeedAdapter {
    path: PathBuf,
    bound_pct: Option<f64>,
}

struct Columns {
    timestamp: usize,
    price: usize,
    high: Option<usize>,
    low: Option<usize>,
}

impl CsvFeedAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            bound_pct: None,
        }
    }

    pub fn with_bound_pct(mut self, pct: f64) -> Self {
        self.bound_pct = Some(pct);
        self
    }

    fn csv_path(&self, coin: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", coin))
        } else {
            self.path.clone()
        }
    }

    fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, SignalError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let mut missing = Vec::new();
        let timestamp = find("timestamp");
        let price = find("price");
        if timestamp.is_none() {
            missing.push("timestamp");
        }
        if price.is_none() {
            missing.push("price");
        }
        match (timestamp, price) {
            (Some(timestamp), Some(price)) => Ok(Columns {
                timestamp,
                price,
                high: find("high"),
                low: find("low"),
            }),
            _ => Err(SignalError::missing_columns(&missing)),
        }
    }
}

fn feed_error(reason: String) -> SignalError {
    SignalError::Feed { reason }
}

/// Unix milliseconds, RFC 3339, `%Y-%m-%d %H:%M:%S`, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_field(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    line: usize,
) -> Result<f64, SignalError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| feed_error(format!("line {}: missing {} value", line, name)))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| feed_error(format!("line {}: invalid {} value: {}", line, name, e)))?;
    if !is_valid_price(value) {
        return Err(feed_error(format!(
            "line {}: {} must be finite and positive, got {}",
            line, name, value
        )));
    }
    Ok(value)
}

fn parse_optional(
    record: &csv::StringRecord,
    idx: Option<usize>,
    name: &str,
    line: usize,
) -> Result<Option<f64>, SignalError> {
    match idx {
        None => Ok(None),
        Some(i) => match record.get(i).map(str::trim) {
            None | Some("") => Ok(None),
            Some(_) => parse_field(record, i, name, line).map(Some),
        },
    }
}

impl PriceFeedPort for CsvFeedAdapter {
    fn fetch_prices(&self, coin: &str) -> Result<Vec<PricePoint>, SignalError> {
        let path = self.csv_path(coin);
        let content = fs::read_to_string(&path)
            .map_err(|e| feed_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| feed_error(format!("CSV parse error: {}", e)))?
            .clone();
        let cols = Self::locate_columns(&headers)?;

        let mut points = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = result.map_err(|e| feed_error(format!("CSV parse error: {}", e)))?;

            let raw_ts = record.get(cols.timestamp).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                feed_error(format!("line {}: invalid timestamp '{}'", line, raw_ts))
            })?;
            let price = parse_field(&record, cols.price, "price", line)?;
            let high = parse_optional(&record, cols.high, "high", line)?;
            let low = parse_optional(&record, cols.low, "low", line)?;

            let point = match (high, low, self.bound_pct) {
                (None, None, Some(pct)) => {
                    PricePoint::with_synthetic_bounds(timestamp, price, pct)
                }
                _ => PricePoint {
                    timestamp,
                    price,
                    high,
                    low,
                },
            };
            points.push(point);
        }

        debug!(coin, path = %path.display(), rows = points.len(), "loaded price feed");
        Ok(points)
    }
}

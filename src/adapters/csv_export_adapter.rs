//! Writes enriched signal rows as CSV for charting.

use crate::domain::error::SignalError;
use crate::domain::signal::SignalRow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const HEADER: [&str; 20] = [
    "timestamp",
    "price",
    "high",
    "low",
    "rsi",
    "macd",
    "macd_signal",
    "macd_diff",
    "bb_high",
    "bb_low",
    "bb_mid",
    "adx",
    "rsi_vote",
    "macd_vote",
    "bb_vote",
    "fib_vote",
    "buy_count",
    "sell_count",
    "signal",
    "is_latest",
];

pub struct CsvExportAdapter {
    path: PathBuf,
}

/// Underlying I/O failures keep their kind; other csv errors stay chained.
fn export_error(e: csv::Error) -> SignalError {
    if !e.is_io_error() {
        return SignalError::Io(e.into());
    }
    match e.into_kind() {
        csv::ErrorKind::Io(io) => SignalError::Io(io),
        kind => SignalError::Io(std::io::Error::other(format!("{kind:?}"))),
    }
}

impl CsvExportAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export(&self, rows: &[SignalRow]) -> Result<(), SignalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(&self.path).map_err(export_error)?;
        wtr.write_record(HEADER).map_err(export_error)?;

        let last = rows.len().saturating_sub(1);
        for (i, row) in rows.iter().enumerate() {
            let ind = &row.indicators;
            let record = [
                ind.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                ind.price.to_string(),
                ind.high.to_string(),
                ind.low.to_string(),
                ind.rsi.to_string(),
                ind.macd.to_string(),
                ind.macd_signal.to_string(),
                ind.macd_diff.to_string(),
                ind.bb_high.to_string(),
                ind.bb_low.to_string(),
                ind.bb_mid.to_string(),
                ind.adx.to_string(),
                row.votes.rsi.to_string(),
                row.votes.macd.to_string(),
                row.votes.bollinger.to_string(),
                row.votes.fibonacci.to_string(),
                row.buy_count.to_string(),
                row.sell_count.to_string(),
                row.signal.to_string(),
                (i == last).to_string(),
            ];
            wtr.write_record(&record).map_err(export_error)?;
        }
        wtr.flush()?;

        info!(path = %self.path.display(), rows = rows.len(), "exported signal rows");
        Ok(())
    }
}

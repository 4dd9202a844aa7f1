//! Single-asset, single-position backtest of the composite signal.
//!
//! Two states: FLAT (cash, no position) and LONG (all cash converted to
//! position). Long while FLAT opens, Short while LONG closes; every other
//! combination is ignored. A run ending LONG is liquidated at the last price.

use crate::domain::error::SignalError;
use crate::domain::price::is_valid_price;
use crate::domain::signal::{Signal, SignalRow};
use chrono::NaiveDateTime;
use tracing::{info, warn};

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const MIN_BACKTEST_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub min_rows: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            min_rows: MIN_BACKTEST_ROWS,
        }
    }
}

/// The two columns the simulator consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeBar {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub signal: Signal,
}

impl From<&SignalRow> for TradeBar {
    fn from(row: &SignalRow) -> Self {
        Self {
            timestamp: row.indicators.timestamp,
            price: row.indicators.price,
            signal: row.signal,
        }
    }
}

/// Ledger entry. Opens are always Long with zero cash left; closes always
/// leave zero position.
#[derive(Debug, Clone, PartialEq)]
pub enum Trade {
    Open {
        entry_time: NaiveDateTime,
        entry_price: f64,
        position: f64,
    },
    Close {
        exit_time: NaiveDateTime,
        exit_price: f64,
        profit: f64,
        balance: f64,
        forced: bool,
    },
}

impl Trade {
    pub fn balance(&self) -> f64 {
        match self {
            Trade::Open { .. } => 0.0,
            Trade::Close { balance, .. } => *balance,
        }
    }

    pub fn position(&self) -> f64 {
        match self {
            Trade::Open { position, .. } => *position,
            Trade::Close { .. } => 0.0,
        }
    }

    pub fn profit(&self) -> Option<f64> {
        match self {
            Trade::Open { .. } => None,
            Trade::Close { profit, .. } => Some(*profit),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_balance: f64,
    pub total_profit: f64,
    pub num_trades: usize,
    pub win_rate: f64,
    pub final_balance: f64,
    pub trades: Vec<Trade>,
}

enum State {
    Flat { balance: f64 },
    Long { entry_price: f64, position: f64 },
}

/// Replays the signal column in time order.
///
/// Fails with [`SignalError::InsufficientData`] (no computation attempted)
/// when fewer than `config.min_rows` bars are supplied, and with
/// [`SignalError::InvalidPrice`] when any price is NaN, infinite, zero or
/// negative.
pub fn run_backtest(
    bars: &[TradeBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, SignalError> {
    if bars.len() < config.min_rows {
        warn!(
            rows = bars.len(),
            minimum = config.min_rows,
            "too few rows to backtest"
        );
        return Err(SignalError::insufficient("backtest", bars.len(), config.min_rows));
    }
    if let Some(index) = bars.iter().position(|b| !is_valid_price(b.price)) {
        warn!(index, price = bars[index].price, "invalid price; backtest refused");
        return Err(SignalError::InvalidPrice {
            index,
            value: bars[index].price,
        });
    }

    let mut state = State::Flat {
        balance: config.initial_balance,
    };
    let mut trades = Vec::new();

    for bar in bars {
        state = match (state, bar.signal) {
            (State::Flat { balance }, Signal::Long) => {
                let position = balance / bar.price;
                info!(time = %bar.timestamp, price = bar.price, position, "open long");
                trades.push(Trade::Open {
                    entry_time: bar.timestamp,
                    entry_price: bar.price,
                    position,
                });
                State::Long {
                    entry_price: bar.price,
                    position,
                }
            }
            (
                State::Long {
                    entry_price,
                    position,
                },
                Signal::Short,
            ) => {
                let close = close_trade(bar, entry_price, position, false);
                let balance = close.balance();
                trades.push(close);
                State::Flat { balance }
            }
            (state, _) => state,
        };
    }

    let final_balance = match state {
        State::Flat { balance } => balance,
        State::Long {
            entry_price,
            position,
        } => {
            // bars is non-empty: min_rows checked above.
            let last = &bars[bars.len() - 1];
            let close = close_trade(last, entry_price, position, true);
            let balance = close.balance();
            trades.push(close);
            balance
        }
    };

    let num_trades = trades.iter().filter(|t| t.profit().is_some()).count();
    let wins = trades
        .iter()
        .filter(|t| t.profit().is_some_and(|p| p > 0.0))
        .count();
    let win_rate = if num_trades > 0 {
        wins as f64 / num_trades as f64 * 100.0
    } else {
        0.0
    };

    let result = BacktestResult {
        initial_balance: config.initial_balance,
        total_profit: final_balance - config.initial_balance,
        num_trades,
        win_rate,
        final_balance,
        trades,
    };
    info!(
        total_profit = result.total_profit,
        num_trades = result.num_trades,
        win_rate = result.win_rate,
        final_balance = result.final_balance,
        "backtest finished"
    );
    Ok(result)
}

/// Backtest straight from the aggregated signal rows.
pub fn run_signal_backtest(
    rows: &[SignalRow],
    config: &BacktestConfig,
) -> Result<BacktestResult, SignalError> {
    let bars: Vec<TradeBar> = rows.iter().map(TradeBar::from).collect();
    run_backtest(&bars, config)
}

/// Sum of realised profit across close records.
pub fn ledger_profit(trades: &[Trade]) -> f64 {
    trades.iter().filter_map(Trade::profit).sum()
}

fn close_trade(bar: &TradeBar, entry_price: f64, position: f64, forced: bool) -> Trade {
    let balance = position * bar.price;
    let profit = (bar.price - entry_price) * position;
    info!(time = %bar.timestamp, price = bar.price, profit, forced, "close long");
    Trade::Close {
        exit_time: bar.timestamp,
        exit_price: bar.price,
        profit,
        balance,
        forced,
    }
}

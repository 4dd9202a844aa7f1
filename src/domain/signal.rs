//! Per-row indicator votes and the composite Long/Short/Hold signal.
//!
//! Composite precedence is asymmetric:
//! 1. any Buy vote → Long (ADX not consulted)
//! 2. else any Sell vote with adx > short threshold → Short
//! 3. else Hold

use crate::domain::fibonacci::{FibRatio, FibonacciLevels, DEFAULT_TOLERANCE};
use crate::domain::indicator_engine::IndicatorRow;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Long,
    Short,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Buy => write!(f, "Buy"),
            Vote::Sell => write!(f, "Sell"),
            Vote::Hold => write!(f, "Hold"),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Long => write!(f, "Long"),
            Signal::Short => write!(f, "Short"),
            Signal::Hold => write!(f, "Hold"),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Sideways => write!(f, "sideways"),
        }
    }
}

/// Thresholds of the fixed rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRules {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub adx_short_threshold: f64,
    pub adx_trend_threshold: f64,
    pub fib_tolerance: f64,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            adx_short_threshold: 20.0,
            adx_trend_threshold: 25.0,
            fib_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Votes {
    pub rsi: Vote,
    pub macd: Vote,
    pub bollinger: Vote,
    pub fibonacci: Vote,
}

impl Votes {
    fn all(&self) -> [Vote; 4] {
        [self.rsi, self.macd, self.bollinger, self.fibonacci]
    }

    pub fn buy_count(&self) -> u8 {
        self.all().iter().filter(|v| **v == Vote::Buy).count() as u8
    }

    pub fn sell_count(&self) -> u8 {
        self.all().iter().filter(|v| **v == Vote::Sell).count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub indicators: IndicatorRow,
    pub votes: Votes,
    pub buy_count: u8,
    pub sell_count: u8,
    pub signal: Signal,
}

impl SignalRules {
    pub fn rsi_vote(&self, rsi: f64) -> Vote {
        if rsi > self.rsi_overbought {
            Vote::Sell
        } else if rsi < self.rsi_oversold {
            Vote::Buy
        } else {
            Vote::Hold
        }
    }

    pub fn macd_vote(&self, macd: f64, macd_signal: f64) -> Vote {
        if macd > macd_signal {
            Vote::Buy
        } else if macd < macd_signal {
            Vote::Sell
        } else {
            Vote::Hold
        }
    }

    pub fn bollinger_vote(&self, price: f64, bb_high: f64, bb_low: f64) -> Vote {
        if price > bb_high {
            Vote::Sell
        } else if price < bb_low {
            Vote::Buy
        } else {
            Vote::Hold
        }
    }

    /// Vote from the first level within tolerance of `price`.
    pub fn fibonacci_vote(&self, price: f64, levels: Option<&FibonacciLevels>) -> Vote {
        match levels.and_then(|l| l.near_level(price, self.fib_tolerance)) {
            Some(FibRatio::R236 | FibRatio::R382 | FibRatio::Half) => Vote::Buy,
            Some(FibRatio::R618 | FibRatio::R786 | FibRatio::One) => Vote::Sell,
            Some(FibRatio::Zero) | None => Vote::Hold,
        }
    }

    pub fn composite(&self, buy_count: u8, sell_count: u8, adx: f64) -> Signal {
        if buy_count > 0 {
            Signal::Long
        } else if sell_count > 0 && adx > self.adx_short_threshold {
            Signal::Short
        } else {
            Signal::Hold
        }
    }

    /// Direction for advisory text only; never feeds the composite signal.
    pub fn trend(&self, row: &IndicatorRow) -> Trend {
        if row.macd > row.macd_signal && row.adx > self.adx_trend_threshold {
            Trend::Up
        } else if row.macd < row.macd_signal && row.adx > self.adx_trend_threshold {
            Trend::Down
        } else {
            Trend::Sideways
        }
    }

    pub fn votes(&self, row: &IndicatorRow, levels: Option<&FibonacciLevels>) -> Votes {
        Votes {
            rsi: self.rsi_vote(row.rsi),
            macd: self.macd_vote(row.macd, row.macd_signal),
            bollinger: self.bollinger_vote(row.price, row.bb_high, row.bb_low),
            fibonacci: self.fibonacci_vote(row.price, levels),
        }
    }

    pub fn signal_row(&self, row: &IndicatorRow, levels: Option<&FibonacciLevels>) -> SignalRow {
        let votes = self.votes(row, levels);
        let buy_count = votes.buy_count();
        let sell_count = votes.sell_count();
        SignalRow {
            indicators: *row,
            votes,
            buy_count,
            sell_count,
            signal: self.composite(buy_count, sell_count, row.adx),
        }
    }
}

/// Votes and composite signal for every row, each from its own price.
pub fn generate_signals(
    rows: &[IndicatorRow],
    levels: Option<&FibonacciLevels>,
    rules: &SignalRules,
) -> Vec<SignalRow> {
    let signals: Vec<SignalRow> = rows.iter().map(|r| rules.signal_row(r, levels)).collect();

    if let Some(last) = signals.last() {
        info!(
            buy_count = last.buy_count,
            sell_count = last.sell_count,
            signal = %last.signal,
            "latest composite signal"
        );
    }
    debug!(
        long = signals.iter().filter(|s| s.signal == Signal::Long).count(),
        short = signals.iter().filter(|s| s.signal == Signal::Short).count(),
        "signals generated"
    );
    signals
}

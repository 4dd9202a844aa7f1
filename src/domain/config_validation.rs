//! Configuration validation.
//!
//! Every key is optional; a present key must hold a usable value. Runs
//! before any analysis so a bad file never produces partial output.

use crate::domain::backtest::{DEFAULT_INITIAL_BALANCE, MIN_BACKTEST_ROWS};
use crate::domain::error::SignalError;
use crate::domain::fibonacci::DEFAULT_TOLERANCE;
use crate::domain::indicator::{adx, bollinger, macd, rsi};
use crate::domain::price::DEFAULT_BOUND_PCT;
use crate::domain::signal::SignalRules;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    validate_coin(config)?;
    validate_indicator_config(config)?;
    validate_signal_config(config)?;
    validate_backtest_config(config)?;
    validate_feed_config(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SignalError {
    SignalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_coin(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("analysis", "coin") {
        Some(s) if s.trim().is_empty() => {
            Err(invalid("analysis", "coin", "coin must not be empty"))
        }
        _ => Ok(()),
    }
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let periods = [
        ("rsi_period", rsi::DEFAULT_PERIOD),
        ("macd_fast", macd::DEFAULT_FAST),
        ("macd_slow", macd::DEFAULT_SLOW),
        ("macd_signal", macd::DEFAULT_SIGNAL),
        ("bollinger_period", bollinger::DEFAULT_PERIOD),
        ("adx_period", adx::DEFAULT_PERIOD),
    ];
    for (key, default) in periods {
        if config.get_int("indicators", key, default as i64) <= 0 {
            return Err(invalid("indicators", key, &format!("{} must be positive", key)));
        }
    }

    let fast = config.get_int("indicators", "macd_fast", macd::DEFAULT_FAST as i64);
    let slow = config.get_int("indicators", "macd_slow", macd::DEFAULT_SLOW as i64);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }

    let mult = config.get_double(
        "indicators",
        "bollinger_stddev",
        bollinger::DEFAULT_STDDEV_MULT,
    );
    if mult <= 0.0 || !mult.is_finite() {
        return Err(invalid(
            "indicators",
            "bollinger_stddev",
            "bollinger_stddev must be positive",
        ));
    }
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let defaults = SignalRules::default();
    let overbought = config.get_double("signals", "rsi_overbought", defaults.rsi_overbought);
    let oversold = config.get_double("signals", "rsi_oversold", defaults.rsi_oversold);

    for (key, value) in [("rsi_overbought", overbought), ("rsi_oversold", oversold)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid("signals", key, &format!("{} must be between 0 and 100", key)));
        }
    }
    if oversold >= overbought {
        return Err(invalid(
            "signals",
            "rsi_oversold",
            "rsi_oversold must be less than rsi_overbought",
        ));
    }

    for (key, default) in [
        ("adx_short_threshold", defaults.adx_short_threshold),
        ("adx_trend_threshold", defaults.adx_trend_threshold),
    ] {
        if config.get_double("signals", key, default) < 0.0 {
            return Err(invalid("signals", key, &format!("{} must be non-negative", key)));
        }
    }

    let tolerance = config.get_double("signals", "fib_tolerance", DEFAULT_TOLERANCE);
    if tolerance <= 0.0 || tolerance >= 1.0 {
        return Err(invalid(
            "signals",
            "fib_tolerance",
            "fib_tolerance must be between 0 and 1 (exclusive)",
        ));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let balance = config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE);
    if balance <= 0.0 || !balance.is_finite() {
        return Err(invalid(
            "backtest",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    if config.get_int("backtest", "min_rows", MIN_BACKTEST_ROWS as i64) < 1 {
        return Err(invalid("backtest", "min_rows", "min_rows must be at least 1"));
    }
    Ok(())
}

pub fn validate_feed_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let pct = config.get_double("feed", "bound_pct", DEFAULT_BOUND_PCT);
    if !(0.0..1.0).contains(&pct) {
        return Err(invalid("feed", "bound_pct", "bound_pct must be in [0, 1)"));
    }
    Ok(())
}

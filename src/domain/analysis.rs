//! End-to-end analysis of one asset's price series.
//!
//! Stage order is fixed: indicators → fibonacci levels → signals →
//! advisory (or fallback) → backtest. Each stage consumes the previous
//! stage's full output; nothing is shared between invocations.

use crate::domain::advisory::{recommend, AdviceOutcome, AdvisoryRequest};
use crate::domain::backtest::{run_signal_backtest, BacktestConfig, BacktestResult};
use crate::domain::error::SignalError;
use crate::domain::fibonacci::{FibRatio, FibonacciLevels};
use crate::domain::indicator_engine::{compute_indicators, IndicatorParams};
use crate::domain::price::PricePoint;
use crate::domain::signal::{generate_signals, SignalRow, SignalRules, Trend};
use crate::ports::advisory_port::AdvisoryPort;
use tracing::{info, warn};

/// Everything one analysis run needs, passed explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub coin: String,
    pub indicators: IndicatorParams,
    pub rules: SignalRules,
    pub backtest: BacktestConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coin: "BTC".to_string(),
            indicators: IndicatorParams::default(),
            rules: SignalRules::default(),
            backtest: BacktestConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub coin: String,
    pub rows: Vec<SignalRow>,
    pub levels: FibonacciLevels,
    pub support: f64,
    pub resistance: f64,
    pub trend: Trend,
    pub near_level: Option<FibRatio>,
    pub advice: AdviceOutcome,
    /// `None` when the series is too short to backtest.
    pub backtest: Option<BacktestResult>,
}

impl Analysis {
    pub fn latest(&self) -> &SignalRow {
        // rows is never empty: analyze rejects empty input.
        &self.rows[self.rows.len() - 1]
    }
}

/// Runs every stage over one asset's series.
///
/// Input problems (missing high/low, unordered timestamps, invalid prices,
/// empty series) fail the whole call: callers get an error, never a partial
/// or degraded `Analysis`. Only the backtest degrades, to `None`, when the
/// series is shorter than `config.backtest.min_rows`; an advisory failure
/// degrades to the rule-based fallback.
pub fn analyze(
    points: &[PricePoint],
    config: &AnalysisConfig,
    provider: Option<&dyn AdvisoryPort>,
) -> Result<Analysis, SignalError> {
    info!(coin = %config.coin, rows = points.len(), "starting analysis");
    if points.is_empty() {
        warn!(coin = %config.coin, "no price data");
        return Err(SignalError::insufficient("analysis", 0, 1));
    }

    let indicator_rows = compute_indicators(points, &config.indicators)?;
    let levels = FibonacciLevels::from_rows(&indicator_rows)
        .ok_or_else(|| SignalError::insufficient("fibonacci", 0, 1))?;
    let rows = generate_signals(&indicator_rows, Some(&levels), &config.rules);

    let latest = rows[rows.len() - 1];
    let (support, resistance) = levels.support_resistance();
    let near_level = levels.near_level(latest.indicators.price, config.rules.fib_tolerance);
    let trend = config.rules.trend(&latest.indicators);

    let request = AdvisoryRequest {
        coin: config.coin.clone(),
        latest,
        near_level,
        support,
        resistance,
    };
    let advice = recommend(provider, &request, &config.rules);

    let backtest = match run_signal_backtest(&rows, &config.backtest) {
        Ok(result) => Some(result),
        Err(e) => {
            warn!(coin = %config.coin, error = %e, "backtest skipped");
            None
        }
    };

    info!(coin = %config.coin, signal = %latest.signal, %trend, "analysis completed");
    Ok(Analysis {
        coin: config.coin.clone(),
        rows,
        levels,
        support,
        resistance,
        trend,
        near_level,
        advice,
        backtest,
    })
}

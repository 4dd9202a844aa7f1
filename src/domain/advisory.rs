//! Advisory recommendation: external provider with a deterministic fallback.
//!
//! The provider is optional. Any failure, including an empty response, is
//! logged and replaced by [`fallback_recommendation`]; nothing here can
//! affect the composite signal or the backtest.

use crate::domain::fibonacci::FibRatio;
use crate::domain::signal::{SignalRow, SignalRules, Trend};
use crate::ports::advisory_port::AdvisoryPort;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Snapshot handed to an advisory provider.
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    pub coin: String,
    pub latest: SignalRow,
    pub near_level: Option<FibRatio>,
    pub support: f64,
    pub resistance: f64,
}

/// One block of advice, in the provider's response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyNote {
    pub trend: String,
    pub strategy: String,
    #[serde(rename = "target", default)]
    pub targets: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Advice {
    #[serde(rename = "strategy", default)]
    pub notes: Vec<StrategyNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "Buy"),
            Action::Sell => write!(f, "Sell"),
            Action::Hold => write!(f, "Hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub trend: Trend,
    pub action: Action,
    pub targets: Option<[f64; 2]>,
}

impl Recommendation {
    pub fn into_advice(self) -> Advice {
        let strategy = match self.action {
            Action::Buy => "Buy: price is rising and not yet overbought.",
            Action::Sell => "Sell: price is falling and not yet oversold.",
            Action::Hold => "Hold",
        };
        Advice {
            notes: vec![StrategyNote {
                trend: format!("Market is trending {}", self.trend),
                strategy: strategy.to_string(),
                targets: self.targets.map(Vec::from).unwrap_or_default(),
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceSource {
    Provider,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdviceOutcome {
    pub advice: Advice,
    pub source: AdviceSource,
}

/// Rule-based recommendation from the latest row and the fib support/resistance.
pub fn fallback_recommendation(
    latest: &SignalRow,
    support: f64,
    resistance: f64,
    rules: &SignalRules,
) -> Recommendation {
    let trend = rules.trend(&latest.indicators);
    let rsi = latest.indicators.rsi;
    let span = resistance - support;

    match trend {
        Trend::Up if rsi < rules.rsi_overbought => Recommendation {
            trend,
            action: Action::Buy,
            targets: Some([resistance + 0.1 * span, resistance + 0.2 * span]),
        },
        Trend::Down if rsi > rules.rsi_oversold => Recommendation {
            trend,
            action: Action::Sell,
            targets: Some([support - 0.1 * span, support - 0.2 * span]),
        },
        _ => Recommendation {
            trend,
            action: Action::Hold,
            targets: None,
        },
    }
}

/// Provider advice when available and non-empty, the fallback otherwise.
pub fn recommend(
    provider: Option<&dyn AdvisoryPort>,
    request: &AdvisoryRequest,
    rules: &SignalRules,
) -> AdviceOutcome {
    let fallback = || AdviceOutcome {
        advice: fallback_recommendation(
            &request.latest,
            request.support,
            request.resistance,
            rules,
        )
        .into_advice(),
        source: AdviceSource::Fallback,
    };

    let Some(provider) = provider else {
        info!(coin = %request.coin, "no advisory provider configured; using fallback");
        return fallback();
    };

    match provider.advise(request) {
        Ok(advice) if !advice.notes.is_empty() => AdviceOutcome {
            advice,
            source: AdviceSource::Provider,
        },
        Ok(_) => {
            warn!(coin = %request.coin, "advisory provider returned no strategy; using fallback");
            fallback()
        }
        Err(e) => {
            warn!(coin = %request.coin, error = %e, "advisory provider failed; using fallback");
            fallback()
        }
    }
}

//! Human-readable renderings of an analysis for the presentation layer.

use crate::domain::advisory::{Advice, AdviceSource};
use crate::domain::analysis::Analysis;
use crate::domain::backtest::{BacktestResult, Trade};
use crate::domain::signal::Signal;
use std::fmt::Write;

/// Buy / Sell / Hold wording of a composite signal.
pub fn signal_label(signal: Signal) -> &'static str {
    match signal {
        Signal::Long => "Buy",
        Signal::Short => "Sell",
        Signal::Hold => "Hold",
    }
}

/// `1234567.891` with 2 decimals → `1,234,567.89`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn signal_summary(analysis: &Analysis) -> String {
    let row = &analysis.latest().indicators;
    let signal = analysis.latest().signal;
    let fib = analysis.near_level.map(|r| r.name()).unwrap_or("N/A");

    let mut out = String::new();
    let _ = writeln!(out, "### {} analysis", analysis.coin);
    let _ = writeln!(out, "- **Signal**: {}", signal_label(signal));
    let _ = writeln!(out, "- **Price**: ${}", format_thousands(row.price, 2));
    let _ = writeln!(out, "- **RSI**: {:.1}", row.rsi);
    let _ = writeln!(out, "- **MACD**: {:.0}, Signal: {:.2}", row.macd, row.macd_signal);
    let _ = writeln!(
        out,
        "- **BB**: ${}/${}",
        format_thousands(row.bb_high, 4),
        format_thousands(row.bb_low, 4)
    );
    let _ = writeln!(out, "- **ADX**: {:.2}", row.adx);
    let _ = writeln!(out, "- **Fib**: {}", fib);
    let _ = writeln!(out, "- **Trend**: {}", analysis.trend);
    out
}

pub fn advice_block(advice: &Advice, source: AdviceSource) -> String {
    let mut out = String::from("\n### Strategy\n");
    match source {
        AdviceSource::Provider => out.push_str("Source: advisory provider\n"),
        AdviceSource::Fallback => out.push_str("Source: rule-based fallback\n"),
    }
    if advice.notes.is_empty() {
        out.push_str("No strategy\n");
        return out;
    }
    for note in &advice.notes {
        let _ = writeln!(out, "- **Trend**: {}", note.trend);
        let _ = writeln!(out, "- **Strategy**: {}", note.strategy);
        if !note.targets.is_empty() {
            let targets: Vec<String> = note
                .targets
                .iter()
                .map(|t| format!("${}", format_thousands(*t, 2)))
                .collect();
            let _ = writeln!(out, "- **Targets**: {}", targets.join(", "));
        }
    }
    out
}

/// Compact plain-text message for outbound notification channels.
pub fn notification_message(analysis: &Analysis) -> String {
    let latest = analysis.latest();
    let row = &latest.indicators;
    let ai = analysis
        .advice
        .advice
        .notes
        .first()
        .map(|n| n.strategy.chars().take(50).collect::<String>())
        .unwrap_or_else(|| "N/A".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{} Signal", analysis.coin);
    let _ = writeln!(out, "Signal: {}", signal_label(latest.signal));
    let _ = writeln!(out, "Price: ${}", format_thousands(row.price, 2));
    let _ = writeln!(out, "RSI: {:.1}", row.rsi);
    let _ = writeln!(out, "MACD: {:.0}, Signal: {:.0}", row.macd, row.macd_signal);
    let _ = writeln!(
        out,
        "BB: ${}/${}",
        format_thousands(row.bb_high, 0),
        format_thousands(row.bb_low, 0)
    );
    let _ = writeln!(out, "ADX: {:.2}", row.adx);
    let _ = writeln!(
        out,
        "Fib: {}",
        analysis.near_level.map(|r| r.name()).unwrap_or("N/A")
    );
    let _ = write!(out, "Strategy: {}", ai);
    out
}

pub fn backtest_summary(result: &BacktestResult) -> String {
    let mut out = String::from("\n### Backtest\n");
    let _ = writeln!(
        out,
        "- **Initial balance**: ${}",
        format_thousands(result.initial_balance, 2)
    );
    let _ = writeln!(
        out,
        "- **Final balance**: ${}",
        format_thousands(result.final_balance, 2)
    );
    let _ = writeln!(
        out,
        "- **Total profit**: ${}",
        format_thousands(result.total_profit, 2)
    );
    let _ = writeln!(out, "- **Trades**: {}", result.num_trades);
    let _ = writeln!(out, "- **Win rate**: {:.2}%", result.win_rate);

    if result.trades.is_empty() {
        return out;
    }

    out.push_str("\n| Time | Side | Price | Position | Profit | Balance |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for trade in &result.trades {
        match trade {
            Trade::Open {
                entry_time,
                entry_price,
                position,
            } => {
                let _ = writeln!(
                    out,
                    "| {} | Long | {:.2} | {:.6} | | {:.2} |",
                    entry_time.format("%Y-%m-%d %H:%M"),
                    entry_price,
                    position,
                    trade.balance()
                );
            }
            Trade::Close {
                exit_time,
                exit_price,
                profit,
                balance,
                forced,
            } => {
                let side = if *forced { "Close (end)" } else { "Close" };
                let _ = writeln!(
                    out,
                    "| {} | {} | {:.2} | {:.6} | {:.2} | {:.2} |",
                    exit_time.format("%Y-%m-%d %H:%M"),
                    side,
                    exit_price,
                    trade.position(),
                    profit,
                    balance
                );
            }
        }
    }
    out
}

pub fn backtest_section(result: Option<&BacktestResult>) -> String {
    match result {
        Some(result) => backtest_summary(result),
        None => "\n### Backtest\nNot enough data to backtest.\n".to_string(),
    }
}

/// Signal summary, strategy, and backtest (when present) as one document.
pub fn full_report(analysis: &Analysis) -> String {
    let mut out = signal_summary(analysis);
    out.push_str(&advice_block(&analysis.advice.advice, analysis.advice.source));
    out.push_str(&backtest_section(analysis.backtest.as_ref()));
    out
}

//! Markdown report adapter implementing ReportPort.
//!
//! Reads a template (the built-in default or a custom file), resolves its
//! `{{PLACEHOLDER}}` markers from the summary renderers, and writes the
//! result.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::analysis::Analysis;
use crate::domain::error::SignalError;
use crate::domain::summary;
use crate::ports::report_port::ReportPort;
use tracing::info;

pub const DEFAULT_TEMPLATE: &str = "\
# {{COIN}} signal report

Period: {{PERIOD}} ({{ROWS}} rows)

{{SIGNAL_SUMMARY}}
- **Support / resistance**: {{SUPPORT}} / {{RESISTANCE}}
{{STRATEGY}}
{{BACKTEST}}";

pub struct MarkdownReportAdapter {
    template_path: Option<PathBuf>,
}

impl MarkdownReportAdapter {
    pub fn new() -> Self {
        Self {
            template_path: None,
        }
    }

    pub fn with_template(path: PathBuf) -> Self {
        Self {
            template_path: Some(path),
        }
    }

    fn load_template(&self) -> Result<String, SignalError> {
        match &self.template_path {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => Ok(DEFAULT_TEMPLATE.to_string()),
        }
    }
}

impl Default for MarkdownReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve every placeholder in `template` for one analysis.
pub fn resolve(template: &str, analysis: &Analysis) -> String {
    let first = analysis.rows[0].indicators.timestamp;
    let last = analysis.latest().indicators.timestamp;
    let period = format!("{} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));

    template
        .replace("{{COIN}}", &analysis.coin)
        .replace("{{PERIOD}}", &period)
        .replace("{{ROWS}}", &analysis.rows.len().to_string())
        .replace("{{SIGNAL_SUMMARY}}", &summary::signal_summary(analysis))
        .replace(
            "{{SUPPORT}}",
            &format!("${}", summary::format_thousands(analysis.support, 2)),
        )
        .replace(
            "{{RESISTANCE}}",
            &format!("${}", summary::format_thousands(analysis.resistance, 2)),
        )
        .replace(
            "{{STRATEGY}}",
            &summary::advice_block(&analysis.advice.advice, analysis.advice.source),
        )
        .replace(
            "{{BACKTEST}}",
            &summary::backtest_section(analysis.backtest.as_ref()),
        )
}

impl ReportPort for MarkdownReportAdapter {
    fn write(&self, analysis: &Analysis, output_path: &Path) -> Result<(), SignalError> {
        let template = self.load_template()?;
        let report = resolve(&template, analysis);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, report)?;
        info!(coin = %analysis.coin, path = %output_path.display(), "report written");
        Ok(())
    }
}

//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::csv_feed_adapter::CsvFeedAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_advisory_adapter::JsonAdvisoryAdapter;
use crate::adapters::markdown_report_adapter::MarkdownReportAdapter;
use crate::domain::analysis::{analyze, Analysis, AnalysisConfig};
use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_BALANCE, MIN_BACKTEST_ROWS};
use crate::domain::config_validation::validate_config;
use crate::domain::error::SignalError;
use crate::domain::fibonacci::DEFAULT_TOLERANCE;
use crate::domain::indicator::{adx, bollinger, macd, rsi};
use crate::domain::indicator_engine::IndicatorParams;
use crate::domain::price::DEFAULT_BOUND_PCT;
use crate::domain::signal::SignalRules;
use crate::domain::summary;
use crate::ports::advisory_port::AdvisoryPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::feed_port::PriceFeedPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "coinsignal",
    about = "Indicator, signal, and backtest engine for daily crypto prices"
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Inputs of the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Price CSV file, or a directory holding `{coin}.csv`
    #[arg(short, long)]
    pub feed: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub coin: Option<String>,
    /// Pre-computed advisory response (JSON)
    #[arg(long)]
    pub advice: Option<PathBuf>,
    /// Write enriched rows as CSV
    #[arg(long)]
    pub export: Option<PathBuf>,
    /// Write the markdown report to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub template: Option<PathBuf>,
    /// Print the compact notification message instead of the full report
    #[arg(long)]
    pub compact: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full analysis and print the report
    Analyze(AnalyzeArgs),
    /// Run the analysis and print only the backtest
    Backtest {
        #[arg(short, long)]
        feed: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        coin: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Runs one command without touching process-wide state.
pub fn execute(command: Command) -> Result<(), SignalError> {
    match command {
        Command::Analyze(args) => run_analyze(args),
        Command::Backtest { feed, config, coin } => {
            run_backtest(&feed, config.as_deref(), coin.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when run is called more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SignalError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn positive_usize(adapter: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    // validate_config has already rejected non-positive values
    let value = adapter.get_int(section, key, default as i64);
    usize::try_from(value).unwrap_or(default)
}

pub fn build_indicator_params(adapter: &dyn ConfigPort) -> IndicatorParams {
    IndicatorParams {
        rsi_period: positive_usize(adapter, "indicators", "rsi_period", rsi::DEFAULT_PERIOD),
        macd_fast: positive_usize(adapter, "indicators", "macd_fast", macd::DEFAULT_FAST),
        macd_slow: positive_usize(adapter, "indicators", "macd_slow", macd::DEFAULT_SLOW),
        macd_signal: positive_usize(adapter, "indicators", "macd_signal", macd::DEFAULT_SIGNAL),
        bollinger_period: positive_usize(
            adapter,
            "indicators",
            "bollinger_period",
            bollinger::DEFAULT_PERIOD,
        ),
        bollinger_stddev_mult: adapter.get_double(
            "indicators",
            "bollinger_stddev",
            bollinger::DEFAULT_STDDEV_MULT,
        ),
        adx_period: positive_usize(adapter, "indicators", "adx_period", adx::DEFAULT_PERIOD),
    }
}

pub fn build_signal_rules(adapter: &dyn ConfigPort) -> SignalRules {
    let d = SignalRules::default();
    SignalRules {
        rsi_overbought: adapter.get_double("signals", "rsi_overbought", d.rsi_overbought),
        rsi_oversold: adapter.get_double("signals", "rsi_oversold", d.rsi_oversold),
        adx_short_threshold: adapter.get_double(
            "signals",
            "adx_short_threshold",
            d.adx_short_threshold,
        ),
        adx_trend_threshold: adapter.get_double(
            "signals",
            "adx_trend_threshold",
            d.adx_trend_threshold,
        ),
        fib_tolerance: adapter.get_double("signals", "fib_tolerance", DEFAULT_TOLERANCE),
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_balance: adapter.get_double(
            "backtest",
            "initial_balance",
            DEFAULT_INITIAL_BALANCE,
        ),
        min_rows: positive_usize(adapter, "backtest", "min_rows", MIN_BACKTEST_ROWS),
    }
}

/// Validates the file, then resolves every section into one config.
/// `coin_override` wins over `[analysis] coin`.
pub fn build_analysis_config(
    adapter: &dyn ConfigPort,
    coin_override: Option<&str>,
) -> Result<AnalysisConfig, SignalError> {
    validate_config(adapter)?;
    let coin = match coin_override {
        Some(c) => c.to_string(),
        None => adapter
            .get_string("analysis", "coin")
            .unwrap_or_else(|| AnalysisConfig::default().coin),
    };
    Ok(AnalysisConfig {
        coin,
        indicators: build_indicator_params(adapter),
        rules: build_signal_rules(adapter),
        backtest: build_backtest_config(adapter),
    })
}

/// Feed adapter honouring `[feed] synthesize_bounds` and `bound_pct`.
pub fn build_feed(adapter: &dyn ConfigPort, path: &Path) -> CsvFeedAdapter {
    let feed = CsvFeedAdapter::new(path.to_path_buf());
    if adapter.get_bool("feed", "synthesize_bounds", true) {
        feed.with_bound_pct(adapter.get_double("feed", "bound_pct", DEFAULT_BOUND_PCT))
    } else {
        feed
    }
}

fn load_analysis(
    feed_path: &Path,
    config_path: Option<&Path>,
    coin: Option<&str>,
    provider: Option<&dyn AdvisoryPort>,
) -> Result<(Analysis, AnalysisConfig), SignalError> {
    let adapter = load_config(config_path)?;
    let config = build_analysis_config(&adapter, coin)?;
    let feed = build_feed(&adapter, feed_path);

    info!(coin = %config.coin, feed = %feed_path.display(), "fetching prices");
    let points = feed.fetch_prices(&config.coin)?;
    let analysis = analyze(&points, &config, provider)?;
    Ok((analysis, config))
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), SignalError> {
    let provider = args.advice.map(JsonAdvisoryAdapter::new);
    let (analysis, _) = load_analysis(
        &args.feed,
        args.config.as_deref(),
        args.coin.as_deref(),
        provider.as_ref().map(|p| p as &dyn AdvisoryPort),
    )?;

    if args.compact {
        println!("{}", summary::notification_message(&analysis));
    } else {
        println!("{}", summary::full_report(&analysis));
    }

    if let Some(path) = args.export {
        CsvExportAdapter::new(path).export(&analysis.rows)?;
    }
    if let Some(path) = args.output {
        let reporter = match args.template {
            Some(t) => MarkdownReportAdapter::with_template(t),
            None => MarkdownReportAdapter::new(),
        };
        reporter.write(&analysis, &path)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_backtest(
    feed_path: &Path,
    config_path: Option<&Path>,
    coin: Option<&str>,
) -> Result<(), SignalError> {
    let (analysis, config) = load_analysis(feed_path, config_path, coin, None)?;
    let result = analysis.backtest.as_ref().ok_or_else(|| {
        SignalError::insufficient("backtest", analysis.rows.len(), config.backtest.min_rows)
    })?;
    println!("{}", summary::backtest_summary(result));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SignalError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(Some(config_path))?;
    let config = build_analysis_config(&adapter, None)?;

    eprintln!("  coin:        {}", config.coin);
    eprintln!("  rsi:         period {}", config.indicators.rsi_period);
    eprintln!(
        "  macd:        {}/{}/{}",
        config.indicators.macd_fast, config.indicators.macd_slow, config.indicators.macd_signal
    );
    eprintln!(
        "  bollinger:   period {}, {:.2} stddev",
        config.indicators.bollinger_period,
        config.indicators.bollinger_stddev_mult
    );
    eprintln!("  adx:         period {}", config.indicators.adx_period);
    eprintln!(
        "  rsi bounds:  {}/{}",
        config.rules.rsi_oversold, config.rules.rsi_overbought
    );
    eprintln!(
        "  backtest:    balance {}, min rows {}",
        config.backtest.initial_balance, config.backtest.min_rows
    );
    eprintln!("Configuration OK");
    Ok(())
}

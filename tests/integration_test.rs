//! End-to-end pipeline tests: feed → indicators → levels → signals →
//! advisory → backtest.

mod common;

use approx::assert_relative_eq;
use common::*;
use coinsignal::adapters::csv_export_adapter::CsvExportAdapter;
use coinsignal::adapters::csv_feed_adapter::CsvFeedAdapter;
use coinsignal::domain::advisory::{Advice, AdviceSource};
use coinsignal::domain::analysis::{analyze, AnalysisConfig};
use coinsignal::domain::backtest::{ledger_profit, Trade};
use coinsignal::domain::error::SignalError;
use coinsignal::domain::indicator_engine::DEFAULTS;
use coinsignal::domain::signal::Signal;
use coinsignal::ports::advisory_port::AdvisoryPort;
use coinsignal::ports::feed_port::PriceFeedPort;

mod pipeline {
    use super::*;

    #[test]
    fn every_input_row_is_kept_in_order() {
        let points = make_points(&wave_prices(60, 40_000.0, 1_500.0));
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();

        assert_eq!(analysis.rows.len(), 60);
        for (row, point) in analysis.rows.iter().zip(&points) {
            assert_eq!(row.indicators.timestamp, point.timestamp);
            assert_eq!(row.indicators.price, point.price);
        }
    }

    #[test]
    fn warmup_rows_carry_defaults() {
        let points = make_points(&wave_prices(60, 40_000.0, 1_500.0));
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();
        let first = &analysis.rows[0].indicators;

        assert_eq!(first.rsi, DEFAULTS.rsi);
        assert_eq!(first.adx, DEFAULTS.adx);
        assert_eq!(first.bb_high, DEFAULTS.bb_high);
        assert_eq!(first.macd, DEFAULTS.macd);

        let late = &analysis.rows[59].indicators;
        assert!(late.rsi > 0.0 && late.rsi <= 100.0);
        assert!(late.bb_high >= late.bb_mid && late.bb_mid >= late.bb_low);
        assert!(late.adx >= 0.0);
    }

    #[test]
    fn default_rsi_in_warmup_votes_buy() {
        // RSI defaults to 0 before its window fills, which is below the
        // oversold bound, so the first row always opens a position.
        let points = make_points(&linear_prices(10, 100.0, 1.0));
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();
        assert_eq!(analysis.rows[0].signal, Signal::Long);

        let result = analysis.backtest.unwrap();
        match &result.trades[0] {
            Trade::Open {
                entry_time,
                entry_price,
                ..
            } => {
                assert_eq!(*entry_time, day(0));
                assert_eq!(*entry_price, 100.0);
            }
            other => panic!("expected open, got {other:?}"),
        }
    }

    #[test]
    fn counts_never_exceed_four() {
        let points = make_points(&rise_then_fall(40, 30, 20_000.0, 150.0));
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();
        for row in &analysis.rows {
            assert!(row.buy_count as u16 + row.sell_count as u16 <= 4);
            if row.buy_count > 0 {
                assert_eq!(row.signal, Signal::Long);
            }
        }
    }

    #[test]
    fn levels_span_the_window() {
        let prices = rise_then_fall(30, 20, 1_000.0, 10.0);
        let points = make_points(&prices);
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();

        let max_high = points.iter().filter_map(|p| p.high).fold(f64::MIN, f64::max);
        let min_low = points.iter().filter_map(|p| p.low).fold(f64::MAX, f64::min);
        assert_eq!(analysis.levels.high(), max_high);
        assert_eq!(analysis.levels.low(), min_low);
        let prices: Vec<f64> = analysis.levels.iter().map(|(_, p)| p).collect();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn ledger_balances() {
        let points = make_points(&wave_prices(120, 30_000.0, 2_500.0));
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();
        let result = analysis.backtest.unwrap();

        assert_relative_eq!(
            ledger_profit(&result.trades),
            result.final_balance - result.initial_balance,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            result.total_profit,
            result.final_balance - result.initial_balance,
            epsilon = 1e-9
        );
        assert!(result.win_rate >= 0.0 && result.win_rate <= 100.0);
        assert!(!matches!(result.trades.last(), Some(Trade::Open { .. })));
    }

    #[test]
    fn short_series_has_no_backtest() {
        let points = make_points(&[100.0, 101.0, 99.0, 100.5]);
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();
        assert!(analysis.backtest.is_none());
        assert_eq!(analysis.rows.len(), 4);
    }

    #[test]
    fn custom_min_rows_is_honoured() {
        let points = make_points(&[100.0, 101.0, 99.0, 100.5]);
        let mut config = AnalysisConfig::default();
        config.backtest.min_rows = 3;
        let analysis = analyze(&points, &config, None).unwrap();
        assert!(analysis.backtest.is_some());
    }

    #[test]
    fn out_of_order_timestamps_are_rejected() {
        let mut points = make_points(&linear_prices(8, 10.0, 1.0));
        points.swap(3, 4);
        let err = analyze(&points, &AnalysisConfig::default(), None).unwrap_err();
        assert!(matches!(err, SignalError::InvalidTimestamps { index: 4 }));
        assert_eq!(err.exit_status(), 5);
    }

    #[test]
    fn invalid_price_is_rejected_before_backtest() {
        let mut points = make_points(&linear_prices(8, 100.0, 1.0));
        points[5].price = f64::NAN;
        let err = analyze(&points, &AnalysisConfig::default(), None).unwrap_err();
        assert!(matches!(err, SignalError::InvalidPrice { index: 5, .. }));
        assert_eq!(err.exit_status(), 5);

        points[5].price = 0.0;
        let err = analyze(&points, &AnalysisConfig::default(), None).unwrap_err();
        assert!(matches!(err, SignalError::InvalidPrice { index: 5, .. }));
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let mut points = make_points(&linear_prices(6, 10.0, 1.0));
        points[2].timestamp = points[1].timestamp;
        let err = analyze(&points, &AnalysisConfig::default(), None).unwrap_err();
        assert!(matches!(err, SignalError::InvalidTimestamps { index: 2 }));
    }
}

mod advisory {
    use super::*;

    fn points() -> Vec<PricePoint> {
        make_points(&wave_prices(50, 50_000.0, 2_000.0))
    }

    #[test]
    fn provider_advice_is_used_once() {
        let provider = MockAdvisory::answering(sample_advice());
        let analysis = analyze(&points(), &AnalysisConfig::default(), Some(&provider)).unwrap();

        assert_eq!(provider.calls.get(), 1);
        assert_eq!(analysis.advice.source, AdviceSource::Provider);
        assert_eq!(analysis.advice.advice, sample_advice());
    }

    #[test]
    fn failing_provider_falls_back() {
        let provider = MockAdvisory::failing("timeout");
        let analysis = analyze(&points(), &AnalysisConfig::default(), Some(&provider)).unwrap();
        assert_eq!(analysis.advice.source, AdviceSource::Fallback);
        assert_eq!(analysis.advice.advice.notes.len(), 1);
        assert!(analysis.advice.advice.notes[0]
            .trend
            .starts_with("Market is trending "));
    }

    #[test]
    fn empty_provider_response_falls_back() {
        let provider = MockAdvisory::answering(Advice::default());
        let analysis = analyze(&points(), &AnalysisConfig::default(), Some(&provider)).unwrap();
        assert_eq!(analysis.advice.source, AdviceSource::Fallback);
    }

    #[test]
    fn advice_never_changes_signals_or_backtest() {
        let provider = MockAdvisory::answering(sample_advice());
        let with = analyze(&points(), &AnalysisConfig::default(), Some(&provider)).unwrap();
        let failing = MockAdvisory::failing("down");
        let without = analyze(&points(), &AnalysisConfig::default(), Some(&failing)).unwrap();

        assert_eq!(with.rows, without.rows);
        assert_eq!(with.backtest, without.backtest);
        assert_eq!(with.trend, without.trend);
    }

    #[test]
    fn request_carries_latest_row() {
        struct Capture(std::cell::RefCell<Option<f64>>);
        impl AdvisoryPort for Capture {
            fn advise(
                &self,
                request: &coinsignal::domain::advisory::AdvisoryRequest,
            ) -> Result<Advice, SignalError> {
                *self.0.borrow_mut() = Some(request.latest.indicators.price);
                assert!(request.support <= request.resistance);
                Ok(Advice::default())
            }
        }

        let pts = points();
        let capture = Capture(std::cell::RefCell::new(None));
        analyze(&pts, &AnalysisConfig::default(), Some(&capture)).unwrap();
        assert_eq!(*capture.0.borrow(), Some(pts[pts.len() - 1].price));
    }
}

mod feeds {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn csv_feed_into_pipeline_and_export() {
        let dir = TempDir::new().unwrap();
        write_feed_csv(dir.path(), "BTC", &wave_prices(40, 60_000.0, 3_000.0));

        let feed = CsvFeedAdapter::new(dir.path().to_path_buf()).with_bound_pct(0.01);
        let points = feed.fetch_prices("BTC").unwrap();
        let analysis = analyze(&points, &AnalysisConfig::default(), None).unwrap();
        assert_eq!(analysis.rows.len(), 40);

        let export = CsvExportAdapter::new(dir.path().join("btc_signals.csv"));
        export.export(&analysis.rows).unwrap();
        let text = std::fs::read_to_string(export.path()).unwrap();
        assert_eq!(text.lines().count(), 41);
        assert!(text.lines().last().unwrap().ends_with(",true"));
    }

    #[test]
    fn price_only_feed_without_bounds_reports_missing_columns() {
        let dir = TempDir::new().unwrap();
        write_feed_csv(dir.path(), "ETH", &linear_prices(10, 2_000.0, 5.0));

        let points = CsvFeedAdapter::new(dir.path().to_path_buf())
            .fetch_prices("ETH")
            .unwrap();
        match analyze(&points, &AnalysisConfig::default(), None) {
            Err(SignalError::MissingColumns { missing }) => {
                assert_eq!(missing, vec!["high", "low"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn nan_row_in_feed_file_is_a_feed_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("BTC.csv"),
            "timestamp,price\n2024-01-01,100\n2024-01-02,101\n2024-01-03,NaN\n",
        )
        .unwrap();

        let err = CsvFeedAdapter::new(dir.path().to_path_buf())
            .with_bound_pct(0.01)
            .fetch_prices("BTC")
            .unwrap_err();
        assert!(matches!(err, SignalError::Feed { .. }));
        assert_eq!(err.exit_status(), 3);
    }

    #[test]
    fn feed_errors_propagate() {
        let feed = MockFeed::new().with_error("SOL", "rate limited");
        let err = feed.fetch_prices("SOL").unwrap_err();
        assert!(matches!(err, SignalError::Feed { .. }));
        assert_eq!(err.exit_status(), 3);
    }

    #[test]
    fn empty_feed_is_insufficient() {
        let feed = MockFeed::new().with_points("DOGE", Vec::new());
        let points = feed.fetch_prices("DOGE").unwrap();
        let err = analyze(&points, &AnalysisConfig::default(), None).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData { rows: 0, .. }));
    }
}

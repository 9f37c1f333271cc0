//! Integration tests across resolver, gateway, normalizer, composer and stats.
//!
//! Tests cover:
//! - Synthetic gold composition from ounce and FX series
//! - Date alignment between the two base series
//! - Failure of either base yielding no data
//! - Windowed statistics over fetched series
//! - The CSV directory gateway feeding the full pipeline

mod common;

use approx::assert_relative_eq;
use common::*;
use std::fs;
use tickerlens::adapters::csv_gateway::CsvGateway;
use tickerlens::domain::catalog::{Category, InstrumentKey, SyntheticKey};
use tickerlens::domain::composer::{compose, compose_checked, load_instrument, SyntheticParams};
use tickerlens::domain::error::GatewayError;
use tickerlens::domain::normalizer::{fetch_series, fetch_series_or_empty};
use tickerlens::domain::resolver::{resolve, ResolverConfig};
use tickerlens::domain::stats::{compute_stats, compute_stats_with_basis, ChangeBasis};
use tickerlens::domain::window::{Lookback, Period};

const GRAMS: f64 = 31.1034768;

fn gold_gateway() -> MockGateway {
    MockGateway::new()
        .with_closes("GC=F", &[("2024-01-01", 100.0), ("2024-01-02", 102.0)])
        .with_closes("TRY=X", &[("2024-01-01", 30.0), ("2024-01-02", 31.0)])
}

mod synthetic_composition {
    use super::*;

    #[test]
    fn gram_gold_from_ounce_and_fx() {
        let gateway = gold_gateway();
        let series = compose(
            &gateway,
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );

        assert_eq!(series.len(), 2);
        let first = &series.bars()[0];
        assert_eq!(first.date, date("2024-01-01"));
        assert_relative_eq!(first.close, 100.0 * 30.0 / GRAMS, epsilon = 1e-9);
        assert_relative_eq!(series.bars()[1].close, 102.0 * 31.0 / GRAMS, epsilon = 1e-9);
        assert_eq!(first.open, first.close);
        assert_eq!(first.high, first.close);
        assert_eq!(first.low, first.close);
    }

    #[test]
    fn quarter_and_half_gold_scale_gram_price() {
        let gateway = gold_gateway();
        let params = SyntheticParams::default();
        let gram = compose(&gateway, SyntheticKey::GramGold, Period::TwoYears, &params);
        let quarter = compose(&gateway, SyntheticKey::QuarterGold, Period::TwoYears, &params);
        let half = compose(&gateway, SyntheticKey::HalfGold, Period::TwoYears, &params);

        for i in 0..2 {
            assert_relative_eq!(quarter.bars()[i].close, gram.bars()[i].close * 1.63, epsilon = 1e-9);
            assert_relative_eq!(half.bars()[i].close, gram.bars()[i].close * 3.26, epsilon = 1e-9);
        }
    }

    #[test]
    fn gram_silver_uses_silver_future() {
        let gateway = MockGateway::new()
            .with_closes("SI=F", &[("2024-01-01", 25.0)])
            .with_closes("TRY=X", &[("2024-01-01", 30.0)]);
        let series = compose(
            &gateway,
            SyntheticKey::GramSilver,
            Period::TwoYears,
            &SyntheticParams::default(),
        );
        assert_eq!(series.len(), 1);
        assert_relative_eq!(series.bars()[0].close, 25.0 * 30.0 / GRAMS, epsilon = 1e-9);
        assert_eq!(gateway.requested_symbols(), vec!["SI=F", "TRY=X"]);
    }

    #[test]
    fn only_shared_dates_survive() {
        let gateway = MockGateway::new()
            .with_closes(
                "GC=F",
                &[("2024-01-01", 100.0), ("2024-01-02", 101.0), ("2024-01-03", 102.0)],
            )
            .with_closes(
                "TRY=X",
                &[("2024-01-02", 30.0), ("2024-01-03", 31.0), ("2024-01-04", 32.0)],
            );
        let series = compose(
            &gateway,
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03")]);
    }

    #[test]
    fn missing_fx_yields_empty_series() {
        let gateway =
            MockGateway::new().with_closes("GC=F", &[("2024-01-01", 100.0), ("2024-01-02", 102.0)]);
        let series = compose(
            &gateway,
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );
        assert!(series.is_empty());
    }

    #[test]
    fn failed_metal_fetch_reports_reason() {
        let gateway = MockGateway::new()
            .with_error("GC=F", "connection reset")
            .with_closes("TRY=X", &[("2024-01-01", 30.0)]);
        let result = compose_checked(
            &gateway,
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );
        assert!(
            matches!(result, Err(GatewayError::Request { symbol, reason }) if symbol == "GC=F" && reason == "connection reset")
        );
    }

    #[test]
    fn disjoint_dates_are_no_data() {
        let gateway = MockGateway::new()
            .with_closes("GC=F", &[("2024-01-01", 100.0)])
            .with_closes("TRY=X", &[("2024-02-01", 30.0)]);
        let result = compose_checked(
            &gateway,
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );
        assert!(matches!(result, Err(GatewayError::NoData { symbol }) if symbol == "GRAM_GOLD"));
    }

    #[test]
    fn configured_fx_symbol_is_used() {
        let gateway = MockGateway::new()
            .with_closes("GC=F", &[("2024-01-01", 100.0)])
            .with_closes("USDTRY=X", &[("2024-01-01", 30.0)]);
        let params = SyntheticParams {
            fx_symbol: "USDTRY=X".to_string(),
            ..SyntheticParams::default()
        };
        let series = compose(&gateway, SyntheticKey::GramGold, Period::TwoYears, &params);
        assert_eq!(series.len(), 1);
    }
}

mod resolve_and_load {
    use super::*;

    #[test]
    fn gold_keyword_flows_into_composition() {
        let config = ResolverConfig::default();
        let resolved = resolve(&config, None, Some("Altın"), Category::DomesticEquity);
        assert_eq!(resolved.key, InstrumentKey::Synthetic(SyntheticKey::GramGold));

        let series = load_instrument(
            &gold_gateway(),
            &resolved.key,
            Period::TwoYears,
            &SyntheticParams::default(),
        )
        .unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn domestic_ticker_fetched_with_suffix() {
        let config = ResolverConfig::default();
        let resolved = resolve(&config, None, Some("asels"), Category::DomesticEquity);
        let gateway = MockGateway::new().with_closes("ASELS.IS", &[("2024-01-01", 60.0)]);

        let series = load_instrument(
            &gateway,
            &resolved.key,
            Period::OneYear,
            &SyntheticParams::default(),
        )
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(gateway.requests.borrow()[0], ("ASELS.IS".to_string(), Period::OneYear));
    }

    #[test]
    fn unknown_symbol_is_empty_not_error() {
        let gateway = MockGateway::new();
        assert!(fetch_series_or_empty(&gateway, "NOPE.IS", Period::TwoYears).is_empty());
        assert!(matches!(
            fetch_series(&gateway, "NOPE.IS", Period::TwoYears),
            Err(GatewayError::NoData { .. })
        ));
    }

    #[test]
    fn timeout_is_reported() {
        let gateway = MockGateway::new().with_timeout("BTC-USD");
        assert!(matches!(
            fetch_series(&gateway, "BTC-USD", Period::TwoYears),
            Err(GatewayError::Timeout { .. })
        ));
    }
}

mod windowed_stats {
    use super::*;

    #[test]
    fn ten_bars_window_of_five() {
        let rows = daily_closes(10);
        let gateway = MockGateway::new().with_table("X", ohlc_table(&as_refs(&rows)));
        let series = fetch_series(&gateway, "X", Period::TwoYears).unwrap();

        let stats = compute_stats(&series, Lookback::Bars(5).bars()).unwrap();
        assert_eq!(stats.bars_in_window, 5);
        assert_eq!(stats.latest_price, 10.0);
        assert_eq!(stats.window_start_price, 6.0);
        assert_relative_eq!(stats.percent_change.unwrap(), 4.0 / 6.0 * 100.0, epsilon = 1e-9);
        assert_eq!(stats.window_high, 11.0);
    }

    #[test]
    fn window_longer_than_series_uses_whole_series() {
        let rows = daily_closes(4);
        let gateway = MockGateway::new().with_closes("X", &as_refs(&rows));
        let series = fetch_series(&gateway, "X", Period::TwoYears).unwrap();

        let stats = compute_stats(&series, Lookback::Year.bars()).unwrap();
        assert_eq!(stats.bars_in_window, 4);
        assert_eq!(stats.window_start_price, 1.0);
        assert_relative_eq!(stats.percent_change.unwrap(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn previous_bar_basis() {
        let rows = daily_closes(10);
        let gateway = MockGateway::new().with_closes("X", &as_refs(&rows));
        let series = fetch_series(&gateway, "X", Period::TwoYears).unwrap();

        let stats = compute_stats_with_basis(&series, 5, ChangeBasis::PreviousBar).unwrap();
        assert_eq!(stats.window_start_price, 9.0);
        assert_relative_eq!(stats.percent_change.unwrap(), 100.0 / 9.0, epsilon = 1e-9);
    }

    #[test]
    fn composed_series_stats() {
        let series = compose(
            &gold_gateway(),
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );
        let stats = compute_stats(&series, Lookback::Week.bars()).unwrap();
        let expected = (102.0 * 31.0 - 100.0 * 30.0) / (100.0 * 30.0) * 100.0;
        assert_relative_eq!(stats.percent_change.unwrap(), expected, epsilon = 1e-9);
        assert_eq!(stats.is_up(), Some(true));
    }
}

mod csv_directory_pipeline {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn gram_gold_from_csv_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("GC=F.csv"),
            "Price,Close,High,Low,Open\n\
             Ticker,GC=F,GC=F,GC=F,GC=F\n\
             2024-01-01,100.0,101.0,99.0,100.0\n\
             2024-01-02,102.0,103.0,101.0,101.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("TRY=X.csv"),
            "Price,Close,High,Low,Open\n\
             Ticker,TRY=X,TRY=X,TRY=X,TRY=X\n\
             2024-01-01,30.0,30.5,29.5,30.0\n\
             2024-01-02,31.0,31.5,30.5,30.0\n",
        )
        .unwrap();

        let gateway = CsvGateway::new(dir.path().to_path_buf()).with_header_rows(2);
        let series = compose(
            &gateway,
            SyntheticKey::GramGold,
            Period::TwoYears,
            &SyntheticParams::default(),
        );

        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.bars()[1].close, 102.0 * 31.0 / GRAMS, epsilon = 1e-9);
    }

    #[test]
    fn unsorted_duplicate_rows_are_normalized() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("THYAO.IS.csv"),
            "Date,Open,High,Low,Close\n\
             2024-01-03,12,13,11,12.5\n\
             2024-01-01,10,11,9,10.5\n\
             2024-01-02,11,12,10,nan\n\
             2024-01-01,10,11,9,10.8\n",
        )
        .unwrap();

        let gateway = CsvGateway::new(dir.path().to_path_buf());
        let series = fetch_series(&gateway, "THYAO.IS", Period::TwoYears).unwrap();

        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-03")]);
        assert_eq!(series.bars()[0].close, 10.8);
    }
}

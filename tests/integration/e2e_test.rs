//! End-to-end integration tests

use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate};
use option_valuation::config::Config;
use option_valuation::market::{MarketData, Treasury};
use option_valuation::model::{
    BlackScholesModel, BlackScholesParams, Frequency, PriceSeries,
};
use option_valuation::report::build_tables;
use option_valuation::valuation::{run, value};
use option_valuation::Stage;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Deterministic daily walk with alternating moves of `step`
fn series(ticker: &str, start: NaiveDate, days: i64, step: f64) -> PriceSeries {
    PriceSeries::from_pairs(
        ticker,
        (0..days).map(|i| {
            let wiggle = if i % 3 == 0 { 1.0 + step } else { 1.0 - step / 2.0 };
            (start + Duration::days(i), 50.0 * wiggle + i as f64 * 0.01)
        }),
    )
    .unwrap()
}

fn config() -> Config {
    Config::from_toml(
        r#"
        [option]
        stock_price = 150.0
        strike_price = 100.0
        grant_date = "2023-12-01"
        valuation_date = "2024-01-10"
        expiration_date = "2025-01-10"
        vesting_end_date = "2025-07-10"

        [volatility]
        public_comps = ["AAA", "BBB", "CCC"]
        frequency = "weekly"
        lookback_years = 2
        "#,
    )
    .unwrap()
}

fn market() -> MarketData {
    let start = date(2021, 6, 1);
    MarketData::new(date(2024, 1, 10))
        .with_series(series("AAA", start, 1000, 0.01))
        .with_series(series("BBB", start, 1000, 0.03))
        .with_yield(Treasury::new("13-week", "^IRX", 0.25), Some(5.2))
        .with_yield(Treasury::new("5-year", "^FVX", 5.0), Some(4.0))
        .with_yield(Treasury::new("10-year", "^TNX", 10.0), None)
        .with_yield(Treasury::new("30-year", "^TYX", 30.0), Some(4.2))
}

#[test]
fn test_config_example_parses() {
    let config = Config::from_toml(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.volatility.frequency, Frequency::Weekly);
    assert_eq!(config.market_data.treasuries.len(), 4);
}

#[test]
fn test_value_from_config_and_market_data() {
    let config = config();
    let result = value(&config.inputs(), &market()).unwrap();

    assert_eq!(result.lookback_years, 2);
    assert_eq!(result.lookback_start, date(2022, 1, 10));
    assert_eq!(result.volatility.per_ticker.len(), 2);
    assert_eq!(result.volatility.excluded.len(), 1);
    assert_eq!(result.volatility.excluded[0].ticker, "CCC");

    // 1.25 years sits between 0.25y (5.2%) and 5y (4.0%)
    let expected_rate = (5.2 + (result.years_to_maturity - 0.25) / 4.75 * (4.0 - 5.2)) / 100.0;
    assert_approx_eq!(result.risk_free_rate, expected_rate, 1e-12);
    assert_eq!(result.yield_curve.len(), 30);

    let expected = BlackScholesModel::new()
        .call_value(&BlackScholesParams {
            spot: 150.0,
            strike: 100.0,
            rate: result.risk_free_rate,
            volatility: result.volatility.average,
            time_to_maturity: result.years_to_maturity,
        })
        .unwrap();
    assert_eq!(result.fair_value, expected);
    assert!(result.fair_value > 50.0 && result.fair_value < 150.0);
}

#[test]
fn test_result_round_trip() {
    let market = market();
    let first = value(&config().inputs(), &market).unwrap();

    let json = serde_json::to_string(&first).unwrap();
    let decoded: option_valuation::valuation::ValuationResult =
        serde_json::from_str(&json).unwrap();
    let second = value(&decoded.inputs, &market).unwrap();

    assert_eq!(first.fair_value, second.fair_value);
}

#[test]
fn test_report_tables_from_result() {
    let result = value(&config().inputs(), &market()).unwrap();
    let tables = build_tables(&result);

    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0].rows[1][1], "1/10/2024");
    assert_eq!(tables[1].rows.last().unwrap()[0], "Average");
    assert_eq!(tables[2].rows[0][0], "1-year");
}

#[test]
fn test_failure_names_stage() {
    let market = MarketData::new(date(2024, 1, 10))
        .with_yield(Treasury::new("10-year", "^TNX", 10.0), Some(4.0));
    let err = value(&config().inputs(), &market).unwrap_err();
    assert_eq!(err.stage, Stage::Volatility);
    assert!(err.to_string().starts_with("volatility stage failed"));
}

#[tokio::test]
async fn test_run_matches_value() {
    let market = market();
    let config = config();
    let treasuries = Treasury::defaults();

    let fetched = run(&config.inputs(), &market, &treasuries).await.unwrap();
    let direct = value(&config.inputs(), &market).unwrap();
    assert_eq!(fetched.fair_value, direct.fair_value);
}

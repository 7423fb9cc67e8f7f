//! Snapshot capture and replay

use chrono::{Duration, NaiveDate};
use option_valuation::market::{fetch_market_data, MarketData, Treasury};
use option_valuation::model::{Frequency, PriceSeries};
use option_valuation::report::{build_tables, ParquetReportWriter};
use option_valuation::valuation::{plan, value, ValuationInputs};
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn inputs() -> ValuationInputs {
    ValuationInputs {
        stock_price: dec!(20),
        strike_price: dec!(25),
        grant_date: date(2024, 3, 1),
        valuation_date: date(2024, 3, 1),
        expiration_date: date(2029, 3, 1),
        vesting_end_date: date(2028, 3, 1),
        public_comps: vec!["AAA".to_string()],
        frequency: Frequency::Monthly,
        lookback_years: None,
    }
}

fn source() -> MarketData {
    let start = date(2019, 1, 1);
    let series = PriceSeries::from_pairs(
        "AAA",
        (0..2000).map(|i| {
            let price = 30.0 + 5.0 * ((i as f64) / 17.0).sin();
            (start + Duration::days(i), price)
        }),
    )
    .unwrap();
    MarketData::new(date(2024, 3, 1))
        .with_series(series)
        .with_yield(Treasury::new("5-year", "^FVX", 5.0), Some(4.2))
}

#[tokio::test]
async fn test_capture_save_load_value() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = inputs();
    let plan = plan(&inputs).unwrap();
    assert_eq!(plan.lookback_years, 4);

    let captured = fetch_market_data(
        &source(),
        &inputs.public_comps,
        plan.window_start,
        inputs.valuation_date,
        &[Treasury::new("5-year", "^FVX", 5.0)],
    )
    .await;
    let path = temp_dir.path().join("snapshot.json");
    captured.save(&path).unwrap();

    let replayed = MarketData::load(&path).unwrap();
    assert_eq!(replayed, captured);

    let from_snapshot = value(&inputs, &replayed).unwrap();
    let from_source = value(&inputs, &source()).unwrap();
    assert_eq!(
        from_snapshot.fair_value.to_bits(),
        from_source.fair_value.to_bits()
    );
    assert_eq!(
        from_snapshot.volatility.average.to_bits(),
        from_source.volatility.average.to_bits()
    );
    assert_eq!(from_snapshot.risk_free_rate, 0.042);

    let writer = ParquetReportWriter::new(temp_dir.path().join("report"));
    let paths = writer.write_all(&build_tables(&from_snapshot)).unwrap();
    assert_eq!(paths.len(), 3);
}

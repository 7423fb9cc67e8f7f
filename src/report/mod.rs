//! Valuation report module
//!
//! Flattens a [`ValuationResult`] into labeled tables ("Black Scholes",
//! "Volatility", "Risk Free Rate") for the Parquet and text writers.

mod parquet;
mod text;

pub use self::parquet::ParquetReportWriter;
pub use self::text::render_table;

use crate::valuation::ValuationResult;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A named table whose cells are already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// File-system friendly version of the table name
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// All report tables, in sheet order
pub fn build_tables(result: &ValuationResult) -> Vec<ReportTable> {
    vec![
        black_scholes_table(result),
        volatility_table(result),
        risk_free_rate_table(result),
    ]
}

/// Inputs and outputs as (label, value) pairs
pub fn summary_fields(result: &ValuationResult) -> Vec<(&'static str, String)> {
    let inputs = &result.inputs;
    vec![
        ("Grant date", us_date(inputs.grant_date)),
        ("Valuation date", us_date(inputs.valuation_date)),
        ("Expiration date", us_date(inputs.expiration_date)),
        ("Vesting end date", us_date(inputs.vesting_end_date)),
        ("Stock price", inputs.stock_price.to_string()),
        ("Strike/Exercise price", inputs.strike_price.to_string()),
        (
            "Years to maturity (YTM)",
            rounded(result.years_to_maturity, 4),
        ),
        ("Risk free rate", rounded(result.risk_free_rate, 4)),
        ("Volatility", rounded(result.volatility.average, 4)),
        ("Option Valuation", rounded(result.fair_value, 2)),
    ]
}

fn black_scholes_table(result: &ValuationResult) -> ReportTable {
    ReportTable {
        name: "Black Scholes".to_string(),
        columns: vec!["Field".to_string(), "Value".to_string()],
        rows: summary_fields(result)
            .into_iter()
            .map(|(label, value)| vec![label.to_string(), value])
            .collect(),
    }
}

fn volatility_table(result: &ValuationResult) -> ReportTable {
    let window = format!(
        "{} to {}",
        result.lookback_start, result.inputs.valuation_date
    );
    let mut rows: Vec<Vec<String>> = result
        .volatility
        .per_ticker
        .iter()
        .map(|v| vec![v.ticker.clone(), rounded(v.volatility * 100.0, 2)])
        .collect();
    rows.extend(
        result
            .volatility
            .excluded
            .iter()
            .map(|e| vec![e.ticker.clone(), "n/a".to_string()]),
    );
    rows.push(vec![
        "Average".to_string(),
        rounded(result.volatility.average * 100.0, 2),
    ]);

    ReportTable {
        name: "Volatility".to_string(),
        columns: vec!["Ticker".to_string(), window],
        rows,
    }
}

fn risk_free_rate_table(result: &ValuationResult) -> ReportTable {
    ReportTable {
        name: "Risk Free Rate".to_string(),
        columns: vec![
            "Maturity".to_string(),
            result.inputs.valuation_date.to_string(),
        ],
        rows: result
            .yield_curve
            .iter()
            .map(|p| {
                vec![
                    format!("{}-year", p.maturity),
                    rounded(p.yield_pct, 2),
                ]
            })
            .collect(),
    }
}

/// M/D/YYYY without zero padding
fn us_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn rounded(value: f64, dp: u32) -> String {
    Decimal::try_from(value)
        .map(|d| d.round_dp(dp).normalize().to_string())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{
        ExcludedComp, Frequency, TickerVolatility, VolatilitySummary, YieldCurvePoint,
    };
    use crate::valuation::ValuationInputs;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn sample_result() -> ValuationResult {
        ValuationResult {
            inputs: ValuationInputs {
                stock_price: dec!(150),
                strike_price: dec!(100),
                grant_date: date(2024, 1, 2),
                valuation_date: date(2024, 1, 10),
                expiration_date: date(2025, 1, 10),
                vesting_end_date: date(2025, 7, 10),
                public_comps: vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()],
                frequency: Frequency::Daily,
                lookback_years: None,
            },
            years_to_maturity: 1.2498288843,
            lookback_years: 1,
            lookback_start: date(2023, 1, 10),
            volatility: VolatilitySummary {
                per_ticker: vec![
                    TickerVolatility {
                        ticker: "AAA".to_string(),
                        volatility: 0.25,
                        observations: 250,
                    },
                    TickerVolatility {
                        ticker: "BBB".to_string(),
                        volatility: 0.35,
                        observations: 250,
                    },
                ],
                excluded: vec![ExcludedComp {
                    ticker: "CCC".to_string(),
                    reason: "no price series".to_string(),
                }],
                average: 0.30,
            },
            yield_curve: vec![
                YieldCurvePoint::new(1.0, 4.8),
                YieldCurvePoint::new(2.0, 4.55),
            ],
            risk_free_rate: 0.0474,
            fair_value: 55.419806689,
        }
    }

    #[test]
    fn test_summary_fields() {
        let fields = summary_fields(&sample_result());
        assert_eq!(fields[0], ("Grant date", "1/2/2024".to_string()));
        assert_eq!(fields[2], ("Expiration date", "1/10/2025".to_string()));
        assert_eq!(fields[6].1, "1.2498");
        assert_eq!(fields[8].1, "0.3");
        assert_eq!(fields[9], ("Option Valuation", "55.42".to_string()));
    }

    #[test]
    fn test_volatility_table() {
        let tables = build_tables(&sample_result());
        let vol = &tables[1];
        assert_eq!(vol.columns[1], "2023-01-10 to 2024-01-10");
        assert_eq!(vol.rows.len(), 4);
        assert_eq!(vol.rows[0], vec!["AAA", "25"]);
        assert_eq!(vol.rows[2], vec!["CCC", "n/a"]);
        assert_eq!(vol.rows[3], vec!["Average", "30"]);
    }

    #[test]
    fn test_risk_free_rate_table() {
        let tables = build_tables(&sample_result());
        let rates = &tables[2];
        assert_eq!(rates.rows[0], vec!["1-year", "4.8"]);
        assert_eq!(rates.rows[1], vec!["2-year", "4.55"]);
    }

    #[test]
    fn test_slug() {
        let tables = build_tables(&sample_result());
        let slugs: Vec<String> = tables.iter().map(|t| t.slug()).collect();
        assert_eq!(slugs, vec!["black_scholes", "volatility", "risk_free_rate"]);
    }
}

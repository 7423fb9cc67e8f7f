//! Valuation orchestrator
//!
//! maturity -> market data -> volatility -> risk-free rate -> pricing.
//! Each failure is reported with the stage that produced it.

use super::{ValuationInputs, ValuationResult};
use crate::error::{AtStage, Stage, StageError, ValuationError};
use crate::market::{fetch_market_data, MarketData, MarketDataSource, Treasury};
use crate::model::{
    default_lookback_years, lookback_start, years_to_maturity, BlackScholesModel,
    BlackScholesParams, VolatilityEstimator, YieldCurve,
};
use crate::telemetry::{
    record_excluded_comp, record_latency, set_gauge, GaugeMetric, LatencyMetric,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Instant;

/// Horizon and historical window derived from the dates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationPlan {
    pub years_to_maturity: f64,
    pub lookback_years: u32,
    /// First day of the volatility window
    pub window_start: NaiveDate,
    /// Valuation date; the window excludes it
    pub window_end: NaiveDate,
}

/// Maturity stage
pub fn plan(inputs: &ValuationInputs) -> Result<ValuationPlan, StageError> {
    let years_to_maturity = years_to_maturity(
        inputs.valuation_date,
        inputs.expiration_date,
        inputs.vesting_end_date,
    );
    let lookback_years = inputs
        .lookback_years
        .unwrap_or_else(|| default_lookback_years(years_to_maturity));
    let window_start = lookback_start(inputs.valuation_date, lookback_years).at(Stage::Maturity)?;

    tracing::info!(
        years_to_maturity,
        lookback_years,
        %window_start,
        "Calculated years to maturity"
    );

    Ok(ValuationPlan {
        years_to_maturity,
        lookback_years,
        window_start,
        window_end: inputs.valuation_date,
    })
}

/// Value an option from market data that is already in hand
///
/// Pure: the same inputs and market data always give the same result.
pub fn value(inputs: &ValuationInputs, market: &MarketData) -> Result<ValuationResult, StageError> {
    let started = Instant::now();
    let plan = plan(inputs)?;

    if market.as_of != inputs.valuation_date {
        return Err(StageError::new(
            Stage::MarketData,
            ValuationError::data_unavailable(
                "market data",
                format!(
                    "gathered as of {}, valuation date is {}",
                    market.as_of, inputs.valuation_date
                ),
            ),
        ));
    }

    // Volatility
    let windowed: BTreeMap<_, _> = market
        .price_series
        .iter()
        .map(|(ticker, series)| {
            (
                ticker.clone(),
                series.between(plan.window_start, plan.window_end),
            )
        })
        .collect();
    let volatility = VolatilityEstimator::new(inputs.frequency)
        .estimate_comps(&inputs.public_comps, &windowed)
        .at(Stage::Volatility)?;
    for excluded in &volatility.excluded {
        record_excluded_comp(&excluded.ticker);
    }
    tracing::info!(
        average = volatility.average,
        comps = volatility.per_ticker.len(),
        excluded = volatility.excluded.len(),
        "Estimated average volatility"
    );

    // Risk-free rate
    let curve = YieldCurve::new(market.yield_points()).at(Stage::RiskFreeRate)?;
    let risk_free_rate = curve
        .rate_at(plan.years_to_maturity)
        .at(Stage::RiskFreeRate)?;
    tracing::info!(
        risk_free_rate,
        maturity = plan.years_to_maturity,
        "Interpolated risk-free rate"
    );

    // Pricing
    let params = BlackScholesParams {
        spot: to_f64("stock_price", inputs.stock_price).at(Stage::Pricing)?,
        strike: to_f64("strike_price", inputs.strike_price).at(Stage::Pricing)?,
        rate: risk_free_rate,
        volatility: volatility.average,
        time_to_maturity: plan.years_to_maturity,
    };
    let fair_value = BlackScholesModel::new()
        .call_value(&params)
        .at(Stage::Pricing)?;
    tracing::info!(fair_value, "Option valuation complete");

    set_gauge(GaugeMetric::YearsToMaturity, plan.years_to_maturity);
    set_gauge(GaugeMetric::AverageVolatility, volatility.average);
    set_gauge(GaugeMetric::RiskFreeRate, risk_free_rate);
    set_gauge(GaugeMetric::FairValue, fair_value);
    record_latency(LatencyMetric::Valuation, started.elapsed());

    Ok(ValuationResult {
        inputs: inputs.clone(),
        years_to_maturity: plan.years_to_maturity,
        lookback_years: plan.lookback_years,
        lookback_start: plan.window_start,
        volatility,
        yield_curve: curve.grid(),
        risk_free_rate,
        fair_value,
    })
}

/// Fetch market data from `source`, then value
pub async fn run<S: MarketDataSource + ?Sized>(
    inputs: &ValuationInputs,
    source: &S,
    treasuries: &[Treasury],
) -> Result<ValuationResult, StageError> {
    let plan = plan(inputs)?;
    tracing::info!(
        start = %plan.window_start,
        end = %plan.window_end,
        comps = inputs.public_comps.len(),
        "Fetching market data"
    );
    let market = fetch_market_data(
        source,
        &inputs.public_comps,
        plan.window_start,
        inputs.valuation_date,
        treasuries,
    )
    .await;
    value(inputs, &market)
}

fn to_f64(name: &str, value: Decimal) -> Result<f64, ValuationError> {
    f64::try_from(value)
        .map_err(|_| ValuationError::Validation(format!("{} {} is not representable", name, value)))
}

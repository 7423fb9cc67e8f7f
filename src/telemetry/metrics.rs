//! Valuation metrics
//!
//! Recorded through the `metrics` facade; a no-op unless the embedding
//! application installs a recorder.

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Comparable price series fetch
    PriceFetch,
    /// Treasury quote fetch
    TreasuryFetch,
    /// Full valuation, market data excluded
    Valuation,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Years to maturity
    YearsToMaturity,
    /// Average comp volatility
    AverageVolatility,
    /// Interpolated risk-free rate
    RiskFreeRate,
    /// Option fair value
    FairValue,
}

impl LatencyMetric {
    fn name(&self) -> &'static str {
        match self {
            LatencyMetric::PriceFetch => "optval_price_fetch_latency_ms",
            LatencyMetric::TreasuryFetch => "optval_treasury_fetch_latency_ms",
            LatencyMetric::Valuation => "optval_valuation_latency_ms",
        }
    }
}

impl GaugeMetric {
    fn name(&self) -> &'static str {
        match self {
            GaugeMetric::YearsToMaturity => "optval_years_to_maturity",
            GaugeMetric::AverageVolatility => "optval_average_volatility",
            GaugeMetric::RiskFreeRate => "optval_risk_free_rate",
            GaugeMetric::FairValue => "optval_fair_value",
        }
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    ::metrics::histogram!(metric.name()).record(value_ms);
    tracing::trace!(metric = metric.name(), value_ms, "Recording latency");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

/// Count a comparable excluded from the volatility average
pub fn record_excluded_comp(ticker: &str) {
    ::metrics::counter!("optval_excluded_comps_total", "ticker" => ticker.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_latency(LatencyMetric::Valuation, Duration::from_millis(5));
        set_gauge(GaugeMetric::FairValue, 12.5);
        record_excluded_comp("ACME");
    }

    #[test]
    fn test_metric_names_are_distinct() {
        let names = [
            LatencyMetric::PriceFetch.name(),
            LatencyMetric::TreasuryFetch.name(),
            LatencyMetric::Valuation.name(),
            GaugeMetric::YearsToMaturity.name(),
            GaugeMetric::AverageVolatility.name(),
            GaugeMetric::RiskFreeRate.name(),
            GaugeMetric::FairValue.name(),
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}

//! Years-to-maturity calculation

use crate::error::ValuationError;
use chrono::{Months, NaiveDate};

/// Day-count divisor for converting calendar days to years
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Signed year fraction from `from` to `to`
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Average of the expiration and vesting horizons, measured from valuation
///
/// Dates before the valuation date give negative horizons. They are returned
/// as-is; pricing rejects a non-positive maturity.
pub fn years_to_maturity(
    valuation_date: NaiveDate,
    expiration_date: NaiveDate,
    vesting_end_date: NaiveDate,
) -> f64 {
    let t_exp = years_between(valuation_date, expiration_date);
    let t_vest = years_between(valuation_date, vesting_end_date);
    (t_exp + t_vest) / 2.0
}

/// Historical window length used when none is configured
///
/// Halves round to even, so 2.5 years gives a 2-year window.
pub fn default_lookback_years(years_to_maturity: f64) -> u32 {
    if !years_to_maturity.is_finite() || years_to_maturity < 1.0 {
        return 1;
    }
    years_to_maturity.round_ties_even() as u32
}

/// First day of a lookback window of `years` whole years ending at `end`
///
/// Feb 29 maps to Feb 28 in non-leap years.
pub fn lookback_start(end: NaiveDate, years: u32) -> Result<NaiveDate, ValuationError> {
    years
        .checked_mul(12)
        .and_then(|months| end.checked_sub_months(Months::new(months)))
        .ok_or_else(|| {
            ValuationError::Validation(format!(
                "lookback of {} years before {} is out of range",
                years, end
            ))
        })
}

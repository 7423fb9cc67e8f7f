//! Treasury yield curve interpolation
//!
//! Linear between known maturities, flat beyond the first and last point.

use super::YieldCurvePoint;
use crate::error::ValuationError;

/// Longest maturity a curve point may carry
pub const MAX_MATURITY_YEARS: f64 = 100.0;

/// Yield curve built from sparse treasury quotes
#[derive(Debug, Clone, PartialEq)]
pub struct YieldCurve {
    points: Vec<YieldCurvePoint>,
}

impl YieldCurve {
    /// Build a curve from points in any order
    pub fn new(points: impl IntoIterator<Item = YieldCurvePoint>) -> Result<Self, ValuationError> {
        let mut points: Vec<YieldCurvePoint> = points.into_iter().collect();
        if points.is_empty() {
            return Err(ValuationError::data_unavailable(
                "treasury yield curve",
                "no yield points",
            ));
        }

        if let Some(bad) = points
            .iter()
            .find(|p| {
                !p.maturity.is_finite()
                    || !p.yield_pct.is_finite()
                    || p.maturity <= 0.0
                    || p.maturity > MAX_MATURITY_YEARS
            })
        {
            return Err(ValuationError::Validation(format!(
                "invalid yield point ({}, {})",
                bad.maturity, bad.yield_pct
            )));
        }

        points.sort_by(|a, b| a.maturity.total_cmp(&b.maturity));
        if let Some(dup) = points.windows(2).find(|w| w[0].maturity == w[1].maturity) {
            return Err(ValuationError::Validation(format!(
                "duplicate yield maturity {}",
                dup[0].maturity
            )));
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[YieldCurvePoint] {
        &self.points
    }

    /// Yield in percent at `maturity`
    pub fn yield_at(&self, maturity: f64) -> Result<f64, ValuationError> {
        if !maturity.is_finite() {
            return Err(ValuationError::Validation(format!(
                "cannot interpolate yield at maturity {}",
                maturity
            )));
        }

        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if maturity <= first.maturity {
            return Ok(first.yield_pct);
        }
        if maturity >= last.maturity {
            return Ok(last.yield_pct);
        }

        // First point strictly above the target; never index 0 after the clamps
        let upper = self.points.partition_point(|p| p.maturity <= maturity);
        let lo = self.points[upper - 1];
        let hi = self.points[upper];
        let weight = (maturity - lo.maturity) / (hi.maturity - lo.maturity);
        Ok(lo.yield_pct + weight * (hi.yield_pct - lo.yield_pct))
    }

    /// Decimal rate at `maturity`
    pub fn rate_at(&self, maturity: f64) -> Result<f64, ValuationError> {
        Ok(self.yield_at(maturity)? / 100.0)
    }

    /// Yields at every whole-year maturity from 1 up to the longest known maturity
    pub fn grid(&self) -> Vec<YieldCurvePoint> {
        let longest = self.points[self.points.len() - 1].maturity.ceil().max(1.0) as u32;
        (1..=longest)
            .filter_map(|m| {
                let maturity = m as f64;
                self.yield_at(maturity)
                    .ok()
                    .map(|y| YieldCurvePoint::new(maturity, y))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn curve(points: &[(f64, f64)]) -> YieldCurve {
        YieldCurve::new(points.iter().map(|(m, y)| YieldCurvePoint::new(*m, *y))).unwrap()
    }

    #[test]
    fn test_interpolates_between_points() {
        let curve = curve(&[(1.0, 2.0), (2.0, 3.0), (3.0, 5.0)]);
        assert_approx_eq!(curve.yield_at(1.5).unwrap(), 2.5, 1e-12);
        assert_approx_eq!(curve.rate_at(1.5).unwrap(), 0.025, 1e-12);
        assert_approx_eq!(curve.yield_at(2.5).unwrap(), 4.0, 1e-12);
    }

    #[test]
    fn test_exact_maturity_returns_known_yield() {
        let curve = curve(&[(1.0, 2.0), (2.0, 3.0), (3.0, 5.0)]);
        assert_eq!(curve.yield_at(2.0).unwrap(), 3.0);
    }

    #[test]
    fn test_unsorted_input() {
        let curve = curve(&[(30.0, 4.5), (1.0, 5.0), (10.0, 4.0), (5.0, 4.2)]);
        assert_eq!(curve.points()[0].maturity, 1.0);
        assert_approx_eq!(curve.yield_at(7.5).unwrap(), 4.1, 1e-12);
    }

    #[test]
    fn test_clamps_outside_range() {
        let curve = curve(&[(1.0, 2.0), (2.0, 3.0), (3.0, 5.0)]);
        assert_eq!(curve.yield_at(0.25).unwrap(), 2.0);
        assert_eq!(curve.yield_at(-1.0).unwrap(), 2.0);
        assert_eq!(curve.yield_at(40.0).unwrap(), 5.0);
    }

    #[test]
    fn test_single_point_is_flat() {
        let curve = curve(&[(5.0, 4.0)]);
        assert_eq!(curve.yield_at(1.0).unwrap(), 4.0);
        assert_eq!(curve.yield_at(10.0).unwrap(), 4.0);
    }

    #[test]
    fn test_grid_fills_whole_years() {
        let curve = curve(&[(1.0, 5.0), (5.0, 4.0), (10.0, 4.5), (30.0, 4.75)]);
        let grid = curve.grid();
        assert_eq!(grid.len(), 30);
        assert_eq!(grid[0], YieldCurvePoint::new(1.0, 5.0));
        assert_approx_eq!(grid[2].yield_pct, 4.5, 1e-12);
        assert_approx_eq!(grid[19].yield_pct, 4.625, 1e-12);
        assert_eq!(grid[29].yield_pct, 4.75);
    }

    #[test]
    fn test_empty_curve() {
        let result = YieldCurve::new(Vec::new());
        assert!(matches!(result, Err(ValuationError::DataUnavailable { .. })));
    }

    #[test]
    fn test_duplicate_maturity() {
        let result = YieldCurve::new(vec![
            YieldCurvePoint::new(1.0, 2.0),
            YieldCurvePoint::new(1.0, 2.5),
        ]);
        assert!(matches!(result, Err(ValuationError::Validation(_))));
    }

    #[test]
    fn test_rejects_maturity_beyond_limit() {
        let result = YieldCurve::new(vec![
            YieldCurvePoint::new(1.0, 2.0),
            YieldCurvePoint::new(1e9, 3.0),
        ]);
        assert!(matches!(result, Err(ValuationError::Validation(_))));

        let at_limit = curve(&[(1.0, 2.0), (MAX_MATURITY_YEARS, 3.0)]);
        assert_eq!(at_limit.grid().len(), 100);
    }

    #[test]
    fn test_non_finite_target() {
        let curve = curve(&[(1.0, 2.0), (2.0, 3.0)]);
        assert!(curve.yield_at(f64::NAN).is_err());
    }
}

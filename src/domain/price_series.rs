use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Date-indexed closing prices for a single asset.
///
/// Dates are strictly ascending (so unique) and every price is positive and
/// finite. The series cannot be mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> AnalysisResult<Self> {
        let ticker = ticker.into();

        for (i, p) in points.iter().enumerate() {
            if !p.price.is_finite() || p.price <= 0.0 {
                return Err(AnalysisError::invalid(format!(
                    "{}: price {} on {} is not a positive number",
                    ticker, p.price, p.date
                )));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(AnalysisError::invalid(format!(
                    "{}: dates must be strictly ascending ({} followed by {})",
                    ticker,
                    points[i - 1].date,
                    p.date
                )));
            }
        }

        Ok(Self { ticker, points })
    }

    /// Convenience for tests and synthetic data: consecutive calendar days from `start`.
    pub fn from_closes(
        ticker: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> AnalysisResult<Self> {
        let points = start
            .iter_days()
            .zip(closes.iter())
            .map(|(date, &price)| PricePoint::new(date, price))
            .collect();
        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn rejects_unordered_dates() {
        let points = vec![PricePoint::new(day(2), 10.0), PricePoint::new(day(1), 11.0)];
        let err = PriceSeries::new("AAPL", points).unwrap_err();
        assert!(matches!(err, AnalysisError::InputValidation(_)));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let points = vec![PricePoint::new(day(1), 10.0), PricePoint::new(day(1), 11.0)];
        assert!(PriceSeries::new("AAPL", points).is_err());
    }

    #[test]
    fn rejects_non_positive_price() {
        let points = vec![PricePoint::new(day(1), 10.0), PricePoint::new(day(2), 0.0)];
        assert!(PriceSeries::new("AAPL", points).is_err());

        let points = vec![PricePoint::new(day(1), f64::NAN)];
        assert!(PriceSeries::new("AAPL", points).is_err());
    }

    #[test]
    fn from_closes_uses_consecutive_days() {
        let s = PriceSeries::from_closes("X", day(30), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.first_date(), Some(day(30)));
        assert_eq!(s.last_date(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(s.prices(), vec![1.0, 2.0, 3.0]);
    }
}

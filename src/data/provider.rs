use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{PricePoint, PriceSeries};
use crate::error::{AnalysisError, AnalysisResult};

/// Abstract interface for fetching daily closes.
///
/// The date range is inclusive at both ends. Any failure (unknown ticker,
/// nothing in range, source down) comes back as
/// [`AnalysisError::DataUnavailable`]; no partial series is ever returned.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Human readable name of the source, for logs.
    fn signature(&self) -> &'static str;

    async fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalysisResult<PriceSeries>;
}

/// Shared tail of every provider: order by date, keep the last row for a
/// repeated date, drop unusable prices and wrap the rest.
pub(crate) fn finish_series(
    ticker: &str,
    mut points: Vec<PricePoint>,
) -> AnalysisResult<PriceSeries> {
    let raw_len = points.len();
    points.retain(|p| p.price.is_finite() && p.price > 0.0);
    if points.len() < raw_len {
        log::warn!(
            "{}: dropped {} rows with missing or non-positive closes",
            ticker,
            raw_len - points.len()
        );
    }

    // Stable sort, then keep the later of any duplicate dates.
    points.sort_by_key(|p| p.date);
    points.reverse();
    points.dedup_by_key(|p| p.date);
    points.reverse();

    if points.is_empty() {
        return Err(AnalysisError::unavailable(ticker, "no prices in the requested range"));
    }

    PriceSeries::new(ticker, points).map_err(|e| AnalysisError::unavailable(ticker, e))
}

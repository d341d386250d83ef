use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::config::SWEEP;
use crate::domain::{WindowPair, WindowRange};
use crate::error::{AnalysisError, AnalysisResult};

/// Everything needed to run one analysis, checked up front so that a bad
/// request never reaches the provider or the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub short_range: WindowRange,
    pub long_range: WindowRange,
    /// Ceiling on evaluated pairs.
    pub max_combinations: usize,
}

impl SweepRequest {
    pub fn new(
        ticker: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        short_range: WindowRange,
        long_range: WindowRange,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
            short_range,
            long_range,
            max_combinations: SWEEP.max_combinations,
        }
    }

    pub fn with_max_combinations(mut self, max_combinations: usize) -> Self {
        self.max_combinations = max_combinations;
        self
    }

    /// Returns the number of pairs the sweep will evaluate.
    pub fn validate(&self) -> AnalysisResult<usize> {
        if self.ticker.trim().is_empty() {
            return Err(AnalysisError::invalid("ticker must not be empty"));
        }
        if self.start > self.end {
            return Err(AnalysisError::invalid(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }

        let Some(pairs) = count_valid_pairs(self.short_range, self.long_range) else {
            return Err(AnalysisError::invalid(format!(
                "window ranges {} x {} give more combinations than can be counted",
                self.short_range, self.long_range
            )));
        };
        if pairs == 0 {
            return Err(AnalysisError::invalid(format!(
                "no short window in {} is below any long window in {}",
                self.short_range, self.long_range
            )));
        }
        if pairs > self.max_combinations {
            return Err(AnalysisError::invalid(format!(
                "{} window combinations requested, limit is {}",
                pairs, self.max_combinations
            )));
        }

        Ok(pairs)
    }

    /// A drill-down pair must be one the sweep could have produced.
    pub fn validate_pair(&self, pair: WindowPair) -> AnalysisResult<()> {
        if !pair.is_valid() {
            return Err(AnalysisError::invalid(format!(
                "pair {} needs 1 <= short < long",
                pair
            )));
        }
        Ok(())
    }
}

/// Short windows that can pair with at least one long window: `short_range`
/// cut off at `long_range.max() - 1`. `None` when nothing is left.
pub(crate) fn usable_shorts(
    short_range: WindowRange,
    long_range: WindowRange,
) -> Option<RangeInclusive<usize>> {
    let hi = short_range.max().min(long_range.max() - 1);
    (short_range.min() <= hi).then(|| short_range.min()..=hi)
}

/// Number of `(short, long)` pairs with `short < long`, in closed form (ranges
/// come straight from user input and may be huge). `None` when the count does
/// not fit in a `usize`.
pub fn count_valid_pairs(short_range: WindowRange, long_range: WindowRange) -> Option<usize> {
    let Some(shorts) = usable_shorts(short_range, long_range) else {
        return Some(0);
    };
    let (lo, hi) = (*shorts.start() as u128, *shorts.end() as u128);
    let (long_min, long_max) = (long_range.min() as u128, long_range.max() as u128);

    // Shorts below long_min pair with every long window.
    let flat_hi = hi.min(long_min - 1);
    let flat = if flat_hi >= lo {
        (flat_hi - lo + 1).checked_mul(long_max - long_min + 1)?
    } else {
        0
    };

    // From long_min upward, short s pairs with long_max - s windows.
    let ramp_lo = lo.max(long_min);
    let ramp = if ramp_lo <= hi {
        let (fewest, most) = (long_max - hi, long_max - ramp_lo);
        (fewest + most).checked_mul(hi - ramp_lo + 1)? / 2
    } else {
        0
    };

    usize::try_from(flat.checked_add(ramp)?).ok()
}

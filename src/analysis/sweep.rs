//! Exhaustive (short, long) window sweep.
//!
//! Pairs are visited short-ascending then long-ascending, skipping every pair
//! with `short >= long`. Evaluation fans out over rayon but results are
//! collected back in visiting order, and the best pair is picked from that
//! ordered list: strictly greater cumulative profit wins, ties keep the
//! earlier pair. Output is therefore identical to a sequential run.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::analysis::moving_average::simple_moving_average;
use crate::analysis::request::usable_shorts;
use crate::analysis::signals::build_records;
use crate::domain::{PriceSeries, WindowPair, WindowRange};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{SignalRecord, SweepOutcome, SweepResult};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Cooperative cancellation for an in-flight sweep. Cheap to clone; all
/// clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run the full sweep. Never fails: an empty set of valid pairs gives an
/// empty outcome with best pair (0, 0) and best profit negative infinity.
pub fn sweep(series: &PriceSeries, short_range: WindowRange, long_range: WindowRange) -> SweepOutcome {
    let pairs = valid_pairs(short_range, long_range);
    if pairs.is_empty() {
        return SweepOutcome::empty();
    }

    let smas = SmaCache::build(series, &pairs);
    let results: Vec<SweepResult> = pairs
        .par_iter()
        .map(|&pair| evaluate_pair(series, pair, &smas))
        .collect();

    select_best(results)
}

/// [`sweep`] with a cancel check before every pair. A raised flag aborts the
/// whole sweep with [`AnalysisError::Cancelled`]; no partial rows escape.
pub fn sweep_with_cancel(
    series: &PriceSeries,
    short_range: WindowRange,
    long_range: WindowRange,
    cancel: &CancelFlag,
) -> AnalysisResult<SweepOutcome> {
    let pairs = valid_pairs(short_range, long_range);
    if pairs.is_empty() {
        return Ok(SweepOutcome::empty());
    }
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }

    let smas = SmaCache::build(series, &pairs);
    let results: Vec<SweepResult> = pairs
        .par_iter()
        .map(|&pair| {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            Ok(evaluate_pair(series, pair, &smas))
        })
        .collect::<AnalysisResult<_>>()?;

    Ok(select_best(results))
}

/// Summary metrics for one pair's record stream.
pub fn summarize(pair: WindowPair, records: &[SignalRecord]) -> SweepResult {
    let closed: Vec<f64> = records.iter().filter_map(|r| r.trade_profit).collect();
    let trade_count = closed.len();
    let profitable_trades = closed.iter().filter(|&&p| p > 0.0).count();

    let profit_percentage = if trade_count == 0 {
        0.0
    } else {
        profitable_trades as f64 / trade_count as f64 * 100.0
    };

    SweepResult {
        short_window: pair.short,
        long_window: pair.long,
        cumulative_profit: records.last().map_or(0.0, |r| r.cumulative_profit),
        profit_percentage,
        trade_count,
        open_at_end: records.last().is_some_and(|r| r.holding),
    }
}

/// Visiting order: short ascending, then long ascending. Only shorts that
/// can pair are walked, and each only over the longs above it.
pub(crate) fn valid_pairs(short_range: WindowRange, long_range: WindowRange) -> Vec<WindowPair> {
    let Some(shorts) = usable_shorts(short_range, long_range) else {
        return Vec::new();
    };

    shorts
        .flat_map(|short| {
            // short <= long_range.max() - 1, so this cannot overflow
            let first_long = long_range.min().max(short + 1);
            (first_long..=long_range.max()).map(move |long| WindowPair::new(short, long))
        })
        .collect()
}

fn evaluate_pair(series: &PriceSeries, pair: WindowPair, smas: &SmaCache) -> SweepResult {
    let records = build_records(series, pair.short, smas.get(pair.short), smas.get(pair.long));
    let row = summarize(pair, &records);

    #[cfg(debug_assertions)]
    if DF.log_sweep_pairs {
        log::debug!(
            "SWEEP [{}] {}: profit {:.4} over {} trades ({:.1}% winners)",
            series.ticker(),
            pair,
            row.cumulative_profit,
            row.trade_count,
            row.profit_percentage
        );
    }

    row
}

fn select_best(results: Vec<SweepResult>) -> SweepOutcome {
    let mut best_pair = WindowPair::default();
    let mut best_profit = f64::NEG_INFINITY;

    for row in &results {
        if row.cumulative_profit > best_profit {
            best_profit = row.cumulative_profit;
            best_pair = row.pair();
        }
    }

    SweepOutcome {
        results,
        best_pair,
        best_profit,
    }
}

/// One SMA per distinct window, shared by every pair that uses it.
struct SmaCache {
    by_window: HashMap<usize, Vec<Option<f64>>>,
    undefined: Vec<Option<f64>>,
}

impl SmaCache {
    fn build(series: &PriceSeries, pairs: &[WindowPair]) -> Self {
        let prices = series.prices();
        let windows: BTreeSet<usize> = pairs.iter().flat_map(|p| [p.short, p.long]).collect();

        let by_window = windows
            .into_par_iter()
            .map(|w| (w, simple_moving_average(&prices, w)))
            .collect();

        Self {
            by_window,
            undefined: vec![None; prices.len()],
        }
    }

    fn get(&self, window: usize) -> &[Option<f64>] {
        self.by_window
            .get(&window)
            .map_or(self.undefined.as_slice(), Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::signals::generate_signals;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        PriceSeries::from_closes("TEST", start, closes).unwrap()
    }

    fn range(min: usize, max: usize) -> WindowRange {
        WindowRange::new(min, max).unwrap()
    }

    #[test]
    fn pairs_skip_equal_and_inverted() {
        let pairs = valid_pairs(range(2, 4), range(3, 5));
        let expected: Vec<_> = [(2, 3), (2, 4), (2, 5), (3, 4), (3, 5), (4, 5)]
            .into_iter()
            .map(|(s, l)| WindowPair::new(s, l))
            .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn huge_ranges_only_walk_usable_shorts() {
        let pairs = valid_pairs(range(1, 3_000_000_000), range(1, 2));
        assert_eq!(pairs, vec![WindowPair::new(1, 2)]);

        assert!(valid_pairs(range(usize::MAX, usize::MAX), range(5, 5)).is_empty());
        assert_eq!(
            valid_pairs(range(usize::MAX - 1, usize::MAX), range(usize::MAX, usize::MAX)),
            vec![WindowPair::new(usize::MAX - 1, usize::MAX)]
        );

        let outcome = sweep(&series(&[1.0, 2.0, 3.0]), range(1, 3_000_000_000), range(1, 2));
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.best_pair, WindowPair::new(1, 2));
    }

    #[test]
    fn summarize_counts_winners() {
        let records = generate_signals(&series(&[10.0, 11.0, 9.0, 12.0, 8.0, 15.0]), 1, 2);
        let row = summarize(WindowPair::new(1, 2), &records);
        assert_eq!(row.trade_count, 2);
        assert_eq!(row.profit_percentage, 0.0);
        assert_eq!(row.cumulative_profit, -6.0);
        assert!(row.open_at_end);
    }

    #[test]
    fn summarize_without_trades_has_zero_percentage() {
        let row = summarize(WindowPair::new(3, 4), &[]);
        assert_eq!(row.trade_count, 0);
        assert_eq!(row.profit_percentage, 0.0);
        assert_eq!(row.cumulative_profit, 0.0);
        assert!(!row.open_at_end);
    }

    #[test]
    fn shared_sma_matches_direct_generation() {
        let s = series(&[5.0, 7.0, 6.0, 9.0, 4.0, 8.0, 10.0, 3.0, 6.0, 11.0, 2.0, 9.0]);
        let outcome = sweep(&s, range(1, 4), range(2, 6));

        for row in &outcome.results {
            let direct = summarize(row.pair(), &generate_signals(&s, row.short_window, row.long_window));
            assert_eq!(*row, direct);
        }
    }

    #[test]
    fn ties_keep_first_pair() {
        // Flat prices: no crossover ever, every pair earns exactly 0.
        let s = series(&[5.0; 10]);
        let outcome = sweep(&s, range(1, 3), range(2, 4));
        assert!(outcome.results.iter().all(|r| r.cumulative_profit == 0.0));
        assert_eq!(outcome.best_pair, WindowPair::new(1, 2));
        assert_eq!(outcome.best_profit, 0.0);
    }

    #[test]
    fn raised_flag_cancels() {
        let s = series(&[1.0, 3.0, 2.0, 4.0, 3.0, 5.0]);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let res = sweep_with_cancel(&s, range(1, 2), range(2, 4), &cancel);
        assert!(matches!(res, Err(AnalysisError::Cancelled)));
    }

    #[test]
    fn cancel_version_matches_plain_sweep() {
        let s = series(&[1.0, 3.0, 2.0, 4.0, 3.0, 5.0, 2.0, 6.0]);
        let plain = sweep(&s, range(1, 3), range(2, 5));
        let checked = sweep_with_cancel(&s, range(1, 3), range(2, 5), &CancelFlag::new()).unwrap();
        assert_eq!(plain, checked);
    }
}

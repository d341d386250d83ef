//! Crossover signals and paired-trade accounting.
//!
//! Given a price series and a (short, long) window pair, every date gets a
//! [`SignalRecord`]: both SMAs, the 0/1 crossover signal, its one-step change
//! (`position`), the profit of any trade closed on that date and the running
//! cumulative profit.
//!
//! # Boundary convention
//! The signal is forced to 0 for every index below `short_window`, even where
//! both averages happen to exist. Elsewhere it is 1 only when both averages are
//! defined and short > long.
//!
//! # Accounting
//! Long-only, one position at a time. A buy while already holding keeps the
//! original open price; a sell while flat is ignored. A position still open
//! when the series ends is never closed, so its unrealized P&L never reaches
//! `cumulative_profit`.

use crate::analysis::moving_average::simple_moving_average;
use crate::domain::PriceSeries;
use crate::models::{Signal, SignalRecord};

/// FLAT/HOLDING machine threaded through the record stream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TradeState {
    #[default]
    Flat,
    Holding {
        open_price: f64,
    },
}

impl TradeState {
    /// Advance on one record. Returns the next state and the profit of a trade
    /// closed by this step, if any.
    pub fn step(self, position: Option<i8>, price: f64) -> (TradeState, Option<f64>) {
        match (self, position) {
            (TradeState::Flat, Some(1)) => (TradeState::Holding { open_price: price }, None),
            (TradeState::Holding { open_price }, Some(-1)) => {
                (TradeState::Flat, Some(price - open_price))
            }
            // stray sell while flat, re-entry while holding, no change
            (state, _) => (state, None),
        }
    }

    pub fn is_holding(&self) -> bool {
        matches!(self, TradeState::Holding { .. })
    }
}

/// Per-date signal records for one window pair.
///
/// `short_window >= long_window` is not rejected; the comparison is just
/// meaningless. The sweep never asks for such pairs.
pub fn generate_signals(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Vec<SignalRecord> {
    let prices = series.prices();
    let short_sma = simple_moving_average(&prices, short_window);
    let long_sma = simple_moving_average(&prices, long_window);

    build_records(series, short_window, &short_sma, &long_sma)
}

/// Same as [`generate_signals`] but with the averages already computed, so a
/// sweep can share one SMA per window across every pair that uses it.
pub(crate) fn build_records(
    series: &PriceSeries,
    short_window: usize,
    short_sma: &[Option<f64>],
    long_sma: &[Option<f64>],
) -> Vec<SignalRecord> {
    debug_assert_eq!(short_sma.len(), series.len());
    debug_assert_eq!(long_sma.len(), series.len());

    let mut records = Vec::with_capacity(series.len());
    let mut state = TradeState::Flat;
    let mut prev_signal: Option<Signal> = None;
    let mut cumulative_profit = 0.0;

    for (i, point) in series.points().iter().enumerate() {
        let signal = crossover_signal(i, short_window, short_sma[i], long_sma[i]);
        let position = prev_signal.map(|prev| signal.value() - prev.value());
        prev_signal = Some(signal);

        let (next, trade_profit) = state.step(position, point.price);
        state = next;

        if let Some(profit) = trade_profit {
            cumulative_profit += profit;
        }

        records.push(SignalRecord {
            date: point.date,
            price: point.price,
            short_sma: short_sma[i],
            long_sma: long_sma[i],
            signal,
            position,
            trade_profit,
            cumulative_profit,
            holding: state.is_holding(),
        });
    }

    records
}

fn crossover_signal(
    index: usize,
    short_window: usize,
    short_sma: Option<f64>,
    long_sma: Option<f64>,
) -> Signal {
    if index < short_window {
        return Signal::Out;
    }
    match (short_sma, long_sma) {
        (Some(s), Some(l)) if s > l => Signal::In,
        _ => Signal::Out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        PriceSeries::from_closes("TEST", start, closes).unwrap()
    }

    #[test]
    fn hand_computed_short_one_long_two() {
        let records = generate_signals(&series(&[10.0, 11.0, 9.0, 12.0, 8.0, 15.0]), 1, 2);

        let short: Vec<_> = records.iter().map(|r| r.short_sma).collect();
        assert_eq!(
            short,
            vec![Some(10.0), Some(11.0), Some(9.0), Some(12.0), Some(8.0), Some(15.0)]
        );

        let long: Vec<_> = records.iter().map(|r| r.long_sma).collect();
        assert_eq!(
            long,
            vec![None, Some(10.5), Some(10.0), Some(10.5), Some(10.0), Some(11.5)]
        );

        let signal: Vec<_> = records.iter().map(|r| r.signal.value()).collect();
        assert_eq!(signal, vec![0, 1, 0, 1, 0, 1]);

        let position: Vec<_> = records.iter().map(|r| r.position).collect();
        assert_eq!(
            position,
            vec![None, Some(1), Some(-1), Some(1), Some(-1), Some(1)]
        );

        let profit: Vec<_> = records.iter().map(|r| r.trade_profit).collect();
        assert_eq!(profit, vec![None, None, Some(-2.0), None, Some(-4.0), None]);

        let cumulative: Vec<_> = records.iter().map(|r| r.cumulative_profit).collect();
        assert_eq!(cumulative, vec![0.0, 0.0, -2.0, -2.0, -6.0, -6.0]);

        // bought at 15 on the last day, never closed
        assert!(records.last().unwrap().holding);
    }

    #[test]
    fn signal_forced_flat_below_short_window() {
        // short 3 / long 4: index 3 is the first with both averages.
        let records = generate_signals(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3, 4);
        assert!(records.iter().take(3).all(|r| r.signal == Signal::Out));
        assert_eq!(records[3].signal, Signal::In);
        assert_eq!(records[3].position, Some(1));
    }

    #[test]
    fn undefined_long_average_means_out() {
        // short 2 / long 5 on 4 points: the long SMA never exists.
        let records = generate_signals(&series(&[1.0, 5.0, 9.0, 20.0]), 2, 5);
        assert!(records.iter().all(|r| r.signal == Signal::Out));
        assert!(records.iter().all(|r| r.trade_profit.is_none()));
        assert_eq!(records.last().unwrap().cumulative_profit, 0.0);
    }

    #[test]
    fn state_machine_transitions() {
        let flat = TradeState::Flat;
        assert_eq!(flat.step(Some(-1), 5.0), (TradeState::Flat, None));
        assert_eq!(flat.step(Some(0), 5.0), (TradeState::Flat, None));
        assert_eq!(flat.step(None, 5.0), (TradeState::Flat, None));

        let (holding, closed) = flat.step(Some(1), 5.0);
        assert_eq!(holding, TradeState::Holding { open_price: 5.0 });
        assert_eq!(closed, None);

        // no re-entry: the first open price stays
        assert_eq!(holding.step(Some(1), 9.0), (holding, None));

        assert_eq!(holding.step(Some(-1), 7.5), (TradeState::Flat, Some(2.5)));
    }

    #[test]
    fn empty_series_gives_no_records() {
        let empty = PriceSeries::new("NONE", Vec::new()).unwrap();
        assert!(generate_signals(&empty, 1, 2).is_empty());
    }
}

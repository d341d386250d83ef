use chrono::NaiveDate;
use sma_sweep::analysis::CancelFlag;
use sma_sweep::engine::SweepEngine;
use sma_sweep::{AnalysisError, PriceSeries, SweepRequest, WindowPair, WindowRange, sweep};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(30);

fn fixture(short: WindowRange, long: WindowRange) -> (SweepRequest, Arc<PriceSeries>) {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let closes: Vec<f64> = (0..120)
        .map(|i| 50.0 + 10.0 * (i as f64 / 7.0).sin() + i as f64 * 0.05)
        .collect();
    let series = PriceSeries::from_closes("SIN", start, &closes).unwrap();
    let request = SweepRequest::new("SIN", start, series.last_date().unwrap(), short, long);
    (request, Arc::new(series))
}

#[test]
fn worker_result_matches_direct_sweep() {
    let short = WindowRange::new(2, 8).unwrap();
    let long = WindowRange::new(5, 25).unwrap();
    let (request, series) = fixture(short, long);

    let mut engine = SweepEngine::new();
    engine.submit(request, series.clone(), Some(WindowPair::new(3, 12)));
    assert_eq!(engine.pending(), 1);

    let job = engine.recv_result_timeout(WAIT).unwrap().unwrap();
    assert_eq!(engine.pending(), 0);
    assert_eq!(job.ticker, "SIN");

    let report = job.result.unwrap();
    assert_eq!(report.outcome, sweep(&series, short, long));
    assert_eq!(report.drill_down.unwrap().records.len(), series.len());
}

#[test]
fn jobs_answer_in_submission_order() {
    let (first, series) = fixture(WindowRange::new(1, 3).unwrap(), WindowRange::new(4, 6).unwrap());
    let mut second = first.clone();
    second.ticker = "SIN2".to_string();

    let mut engine = SweepEngine::new();
    engine.submit(first, series.clone(), None);
    engine.submit(second, series, None);

    let a = engine.recv_result_timeout(WAIT).unwrap().unwrap();
    let b = engine.recv_result_timeout(WAIT).unwrap().unwrap();
    assert_eq!((a.ticker.as_str(), b.ticker.as_str()), ("SIN", "SIN2"));
    assert!(engine.try_recv_result().unwrap().is_none());
}

#[test]
fn raised_flag_cancels_queued_job() {
    let (request, series) = fixture(WindowRange::new(1, 5).unwrap(), WindowRange::new(6, 9).unwrap());
    let mut engine = SweepEngine::new();

    let cancel = CancelFlag::new();
    cancel.cancel();
    engine.submit_with_cancel(request.clone(), series.clone(), None, cancel);
    let job = engine.recv_result_timeout(WAIT).unwrap().unwrap();
    assert!(matches!(job.result, Err(AnalysisError::Cancelled)));

    // later jobs get fresh flags
    engine.submit(request, series, None);
    assert!(engine.recv_result_timeout(WAIT).unwrap().unwrap().result.is_ok());
}

use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use super::messages::{JobRequest, JobResult};

use crate::analysis::{generate_signals, sweep_with_cancel};
use crate::config::DF;
use crate::error::AnalysisResult;
use crate::models::{AnalysisReport, DrillDown};
use crate::utils::AppInstant;

/// Spawns a background thread to process jobs until the request channel closes.
pub fn spawn_worker_thread(rx: Receiver<JobRequest>, tx: Sender<JobResult>) {
    thread::spawn(move || {
        while let Ok(req) = rx.recv() {
            process_request_sync(req, &tx);
        }
        if DF.log_worker {
            log::info!("WORKER: request channel closed, exiting");
        }
    });
}

pub fn process_request_sync(req: JobRequest, tx: &Sender<JobResult>) {
    let label = format!(
        "{} {} x {} over {} days",
        req.request.ticker,
        req.request.short_range,
        req.request.long_range,
        req.series.len()
    );

    crate::trace_time!(&format!("Total JOB [{}]", label), 5000, {
        let start = AppInstant::now();

        if DF.log_worker {
            log::info!("WORKER: start {}", label);
        }

        let result = build_report(&req);
        let elapsed = start.elapsed().as_millis();

        if DF.log_worker {
            match &result {
                Ok(_) => log::info!("WORKER: done {} in {}ms", label, elapsed),
                Err(e) => log::info!("WORKER: {} ended early: {}", label, e),
            }
        }

        // Receiver gone means nobody wants the answer any more.
        let _ = tx.send(JobResult {
            ticker: req.request.ticker.clone(),
            duration_ms: elapsed,
            result,
        });
    });
}

fn build_report(req: &JobRequest) -> AnalysisResult<AnalysisReport> {
    let outcome = crate::trace_time!(&format!("1. Sweep [{}]", req.request.ticker), 1000, {
        sweep_with_cancel(
            &req.series,
            req.request.short_range,
            req.request.long_range,
            &req.cancel,
        )
    })?;

    let drill_down = req.drill.map(|pair| DrillDown {
        pair,
        records: generate_signals(&req.series, pair.short, pair.long),
    });

    Ok(AnalysisReport {
        ticker: req.request.ticker.clone(),
        start: req.request.start,
        end: req.request.end,
        short_range: req.request.short_range,
        long_range: req.request.long_range,
        series_len: req.series.len(),
        outcome,
        drill_down,
    })
}

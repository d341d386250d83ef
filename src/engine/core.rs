use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::time::Duration;

use anyhow::{Result, bail};

use crate::analysis::{CancelFlag, SweepRequest};
use crate::config::DF;
use crate::domain::{PriceSeries, WindowPair};

use super::messages::{JobRequest, JobResult};
use super::worker;

/// Front end of the sweep worker thread.
///
/// Jobs are processed one at a time in submission order. The caller polls
/// for results, which keeps an async front end free to watch for Ctrl-C
/// while a large sweep runs.
pub struct SweepEngine {
    job_tx: Sender<JobRequest>,
    result_rx: Receiver<JobResult>,
    /// Flags of jobs submitted but not yet answered, oldest first.
    in_flight: Vec<CancelFlag>,
}

impl SweepEngine {
    pub fn new() -> Self {
        let (job_tx, job_rx) = channel::<JobRequest>();
        let (result_tx, result_rx) = channel::<JobResult>();

        worker::spawn_worker_thread(job_rx, result_tx);

        Self {
            job_tx,
            result_rx,
            in_flight: Vec::new(),
        }
    }

    /// Queue a sweep. Returns the job's cancel flag.
    pub fn submit(
        &mut self,
        request: SweepRequest,
        series: Arc<PriceSeries>,
        drill: Option<WindowPair>,
    ) -> CancelFlag {
        let cancel = CancelFlag::new();
        self.submit_with_cancel(request, series, drill, cancel.clone());
        cancel
    }

    /// Queue a sweep tied to a caller-owned flag (e.g. one shared with a UI).
    pub fn submit_with_cancel(
        &mut self,
        request: SweepRequest,
        series: Arc<PriceSeries>,
        drill: Option<WindowPair>,
        cancel: CancelFlag,
    ) {
        if DF.log_worker {
            log::info!(
                "ENGINE: queueing {} ({} points, drill {:?})",
                request.ticker,
                series.len(),
                drill
            );
        }

        let job = JobRequest {
            request,
            series,
            drill,
            cancel: cancel.clone(),
        };

        if self.job_tx.send(job).is_err() {
            log::error!("ENGINE: worker thread is gone, job dropped");
        } else {
            self.in_flight.push(cancel);
        }
    }

    /// Raise the flag of every job still in flight.
    pub fn cancel_all(&self) {
        for flag in &self.in_flight {
            flag.cancel();
        }
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Non-blocking poll. Errors only if the worker thread has died.
    pub fn try_recv_result(&mut self) -> Result<Option<JobResult>> {
        match self.result_rx.try_recv() {
            Ok(res) => {
                self.mark_answered();
                Ok(Some(res))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => bail!("sweep worker thread exited unexpectedly"),
        }
    }

    /// Blocking poll with a deadline. `Ok(None)` on timeout.
    pub fn recv_result_timeout(&mut self, timeout: Duration) -> Result<Option<JobResult>> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(res) => {
                self.mark_answered();
                Ok(Some(res))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => bail!("sweep worker thread exited unexpectedly"),
        }
    }

    fn mark_answered(&mut self) {
        if !self.in_flight.is_empty() {
            self.in_flight.remove(0);
        }
    }
}

impl Default for SweepEngine {
    fn default() -> Self {
        Self::new()
    }
}

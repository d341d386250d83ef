use std::sync::Arc;

use crate::analysis::{CancelFlag, SweepRequest};
use crate::domain::{PriceSeries, WindowPair};
use crate::error::AnalysisError;
use crate::models::AnalysisReport;

/// A validated request plus the series it runs over.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub request: SweepRequest,
    pub series: Arc<PriceSeries>,
    /// Also emit per-date records for this pair.
    pub drill: Option<WindowPair>,
    pub cancel: CancelFlag,
}

/// The result returned by the worker
#[derive(Debug)]
pub struct JobResult {
    pub ticker: String,
    pub duration_ms: u128,
    pub result: Result<AnalysisReport, AnalysisError>,
}

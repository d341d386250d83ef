use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{WindowPair, WindowRange};
use crate::models::{SignalRecord, SweepOutcome};

/// Per-date records for one chosen pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDown {
    pub pair: WindowPair,
    pub records: Vec<SignalRecord>,
}

/// Complete answer to one request, ready to print or serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub short_range: WindowRange,
    pub long_range: WindowRange,
    /// Number of price points the sweep ran over.
    pub series_len: usize,
    pub outcome: SweepOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drill_down: Option<DrillDown>,
}

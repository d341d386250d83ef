mod analysis_report;
mod signal_record;
mod sweep_result;

pub use analysis_report::{AnalysisReport, DrillDown};
pub use signal_record::{Signal, SignalRecord};
pub use sweep_result::{SweepOutcome, SweepResult};

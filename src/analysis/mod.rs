// Signal generation and the parameter sweep
pub mod moving_average;
pub mod request;
pub mod signals;
pub mod sweep;

pub use moving_average::simple_moving_average;
pub use request::{SweepRequest, count_valid_pairs};
pub use signals::{TradeState, generate_signals};
pub use sweep::{CancelFlag, summarize, sweep, sweep_with_cancel};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Crossover state: is the short SMA above the long SMA?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Signal {
    #[default]
    Out,
    In,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Out => 0,
            Signal::In => 1,
        }
    }
}

/// One row of the per-date drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub price: f64,

    // None until the window has enough history
    pub short_sma: Option<f64>,
    pub long_sma: Option<f64>,

    pub signal: Signal,
    /// +1 buy, -1 sell, 0 no change. None on the first record.
    pub position: Option<i8>,

    /// Realized profit, only on the record whose sell closes an open buy.
    pub trade_profit: Option<f64>,
    pub cumulative_profit: f64,

    /// Still holding after this record.
    pub holding: bool,
}

impl SignalRecord {
    pub fn is_buy(&self) -> bool {
        self.position == Some(1)
    }

    pub fn is_sell(&self) -> bool {
        self.position == Some(-1)
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::WindowPair;

/// Summary of one (short, long) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub short_window: usize,
    pub long_window: usize,
    /// Final cumulative profit (0.0 when no trade ever closed).
    pub cumulative_profit: f64,
    /// Share of closed trades with positive profit, 0..=100. 0.0 when `trade_count == 0`.
    pub profit_percentage: f64,
    pub trade_count: usize,
    /// Still in a position when the series ran out; its unrealized P&L is not counted.
    pub open_at_end: bool,
}

impl SweepResult {
    pub fn pair(&self) -> WindowPair {
        WindowPair::new(self.short_window, self.long_window)
    }
}

/// Everything a sweep produces: all rows in iteration order plus the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub results: Vec<SweepResult>,
    /// (0, 0) when no valid combination existed.
    pub best_pair: WindowPair,
    /// Negative infinity when no valid combination existed.
    #[serde(with = "non_finite")]
    pub best_profit: f64,
}

impl SweepOutcome {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            best_pair: WindowPair::default(),
            best_profit: f64::NEG_INFINITY,
        }
    }

    pub fn has_valid_combinations(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn best(&self) -> Option<&SweepResult> {
        if !self.has_valid_combinations() {
            return None;
        }
        self.results.iter().find(|r| r.pair() == self.best_pair)
    }
}

// JSON has no infinity; the empty-sweep sentinel goes out as null.
mod non_finite {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            s.serialize_f64(*v)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NEG_INFINITY))
    }
}

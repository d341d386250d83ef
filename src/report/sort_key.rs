use {
    crate::models::SweepResult,
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString},
};

/// Ordering of the results table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Default,
)]
#[strum(ascii_case_insensitive)]
pub enum SortKey {
    /// Highest cumulative profit first.
    #[strum(serialize = "profit")]
    #[default]
    Profit,

    #[strum(serialize = "win-rate")]
    WinRate,

    #[strum(serialize = "trades")]
    Trades,

    /// Sweep order: short ascending, then long ascending.
    #[strum(serialize = "pair")]
    Pair,
}

impl SortKey {
    /// Metrics sort best first and `Pair` in sweep order; `reverse` flips the
    /// direction. Stable: rows that compare equal stay in sweep order.
    pub fn sorted<'a>(&self, results: &'a [SweepResult], reverse: bool) -> Vec<&'a SweepResult> {
        let mut rows: Vec<&SweepResult> = results.iter().collect();
        let ascending = |a: &SweepResult, b: &SweepResult| match self {
            SortKey::Profit => a.cumulative_profit.total_cmp(&b.cumulative_profit),
            SortKey::WinRate => a.profit_percentage.total_cmp(&b.profit_percentage),
            SortKey::Trades => a.trade_count.cmp(&b.trade_count),
            SortKey::Pair => (a.short_window, a.long_window).cmp(&(b.short_window, b.long_window)),
        };

        let best_first = !matches!(self, SortKey::Pair);
        if best_first != reverse {
            rows.sort_by(|a, b| ascending(b, a));
        } else {
            rows.sort_by(|a, b| ascending(a, b));
        }
        rows
    }
}

//! Sweep limits and presentation defaults

/// The Master Sweep Configuration
pub struct SweepConfig {
    /// Upper bound on evaluated (short, long) pairs per request.
    /// Each pair costs O(series length), so a 500x500 range on ten years of
    /// daily closes is already ~300M record steps.
    pub max_combinations: usize,
    /// How many result rows the console report shows by default.
    pub default_top_n: usize,
    /// Default window ranges when none are supplied on the command line.
    pub default_short_range: &'static str,
    pub default_long_range: &'static str,
}

pub const SWEEP: SweepConfig = SweepConfig {
    max_combinations: 250_000,
    default_top_n: 20,
    default_short_range: "5-20",
    default_long_range: "20-60",
};

//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Log every evaluated (short, long) pair with its summary row.
    pub log_sweep_pairs: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,

    /// Provider requests, retries and row counts.
    pub log_provider: bool,

    /// Cache hits, misses and upserts.
    pub log_price_cache: bool,

    pub log_worker: bool,
}

pub const DF: LogFlags = LogFlags {
    log_sweep_pairs: false,
    log_performance: false,
    log_provider: true,
    log_price_cache: true,
    log_worker: false,
};

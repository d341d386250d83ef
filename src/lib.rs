#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types outside of crate (for fill_cache.rs and tests)
pub use analysis::{SweepRequest, generate_signals, simple_moving_average, sweep};
pub use config::{PERSISTENCE, SWEEP};
pub use domain::{PricePoint, PriceSeries, WindowPair, WindowRange};
pub use error::{AnalysisError, AnalysisResult};
pub use models::{AnalysisReport, SignalRecord, SweepOutcome, SweepResult};
pub use report::SortKey;

// CLI argument parsing
use {chrono::NaiveDate, clap::Parser, std::path::PathBuf};

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    utils::TimeUtils::parse_date(text).map_err(|e| format!("expected YYYY-MM-DD ({})", e))
}

/// Sweep SMA crossover window pairs over a ticker's daily closes.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ticker symbol, e.g. SPY
    pub ticker: String,

    /// First date (inclusive), YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last date (inclusive), YYYY-MM-DD. Defaults to today
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Short window range "min-max" (or a single "n")
    #[arg(long, default_value = SWEEP.default_short_range)]
    pub short: WindowRange,

    /// Long window range "min-max" (or a single "n")
    #[arg(long, default_value = SWEEP.default_long_range)]
    pub long: WindowRange,

    /// Read closes from this CSV file instead of Yahoo Finance
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Use API as primary source instead of the local cache
    #[arg(long, default_value_t = false)]
    pub prefer_api: bool,

    /// Skip the local price cache entirely
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// SQLite cache location (defaults to price_data/closes.sqlite)
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// Also print per-date signals for one pair, e.g. 10-50
    #[arg(long)]
    pub pair: Option<WindowPair>,

    /// Rows to show in the results table (0 = all)
    #[arg(long, default_value_t = SWEEP.default_top_n)]
    pub top: usize,

    /// Results ordering: profit, win-rate, trades, pair
    #[arg(long, default_value_t = SortKey::Profit)]
    pub sort: SortKey,

    /// Flip the sort direction (worst first; pairs descending)
    #[arg(long, default_value_t = false)]
    pub reverse: bool,

    /// Write per-date signals (the --pair one, else the best pair) to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Refuse sweeps with more window pairs than this
    #[arg(long, default_value_t = SWEEP.max_combinations)]
    pub max_combinations: usize,

    /// Emit the full report as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

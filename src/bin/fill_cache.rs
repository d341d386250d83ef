use {
    anyhow::{Context, Result, bail},
    chrono::NaiveDate,
    clap::Parser,
    sma_sweep::{
        config::{YAHOO, price_cache_path},
        data::{CachedProvider, PriceSeriesProvider, PriceStorage, SqliteStorage, YahooProvider},
        utils::TimeUtils,
    },
    std::{path::PathBuf, sync::Arc},
};

/// Download daily closes for a set of tickers into the local SQLite cache,
/// so later sweeps can run offline.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tickers to fetch
    #[arg(required = true)]
    tickers: Vec<String>,

    /// First date (inclusive), YYYY-MM-DD
    #[arg(long, value_parser = |s: &str| TimeUtils::parse_date(s))]
    start: NaiveDate,

    /// Last date (inclusive). Defaults to today
    #[arg(long, value_parser = |s: &str| TimeUtils::parse_date(s))]
    end: Option<NaiveDate>,

    #[arg(long)]
    cache_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let end = args.end.unwrap_or_else(TimeUtils::today);
    let db_path = args.cache_path.unwrap_or_else(price_cache_path);

    log::info!("Filling price cache {:?} ({} .. {})", db_path, args.start, end);

    // 2. Connect to DB
    let storage = SqliteStorage::new(&db_path)
        .await
        .with_context(|| format!("Failed to open SQLite cache at {:?}", db_path))?;
    storage.initialize().await?;
    let storage: Arc<dyn PriceStorage> = Arc::new(storage);

    // 3. Always hit the API; the cache only answers if Yahoo is down.
    let provider = CachedProvider::new(YahooProvider::new(YAHOO)?, storage, true);

    let mut failed = Vec::new();
    for ticker in &args.tickers {
        match provider.fetch_series(ticker, args.start, end).await {
            Ok(series) => log::info!(
                "{}: {} closes ({:?} .. {:?})",
                ticker,
                series.len(),
                series.first_date(),
                series.last_date()
            ),
            Err(e) => {
                log::warn!("{}: {}", ticker, e);
                failed.push(ticker.as_str());
            }
        }
    }

    check_failures(&failed, args.tickers.len())?;
    log::info!("Done. {} tickers cached.", args.tickers.len());
    Ok(())
}

/// Any ticker that could not be fetched makes the run fail (non-zero exit).
fn check_failures(failed: &[&str], total: usize) -> Result<()> {
    if !failed.is_empty() {
        bail!("{} of {} tickers failed: {}", failed.len(), total, failed.join(", "));
    }
    Ok(())
}

//! Request orchestration: validate, fetch, sweep on the worker, render.

use {
    crate::{
        Cli,
        analysis::{SweepRequest, generate_signals},
        config::{YAHOO, price_cache_path},
        data::{
            CachedProvider, CsvFileProvider, PriceSeriesProvider, PriceStorage, SqliteStorage,
            YahooProvider,
        },
        domain::{PriceSeries, WindowPair},
        engine::{JobResult, SweepEngine},
        models::{AnalysisReport, DrillDown},
        report,
        utils::{TimeUtils, format_duration},
    },
    anyhow::{Context, Result, bail},
    std::{path::Path, sync::Arc, time::Duration},
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run one analysis end to end and return the rendered output.
///
/// Validation happens before any I/O, so a bad request never touches the
/// network or the cache.
pub async fn run(cli: Cli) -> Result<String> {
    let end = cli.end.unwrap_or_else(TimeUtils::today);
    let request = SweepRequest::new(cli.ticker.trim(), cli.start, end, cli.short, cli.long)
        .with_max_combinations(cli.max_combinations);

    let pair_count = request.validate()?;
    if let Some(pair) = cli.pair {
        request.validate_pair(pair)?;
    }

    let provider = build_provider(&cli).await?;
    log::info!(
        "Fetching {} ({} .. {}) from {}",
        request.ticker,
        request.start,
        request.end,
        provider.signature()
    );
    let series = provider
        .fetch_series(&request.ticker, request.start, request.end)
        .await?;

    log::info!(
        "Sweeping {} window pairs over {} closes",
        pair_count,
        series.len()
    );

    let series = Arc::new(series);
    let mut engine = SweepEngine::new();
    engine.submit(request, Arc::clone(&series), cli.pair);
    let job = wait_for_result(&mut engine).await?;

    log::info!("Sweep finished in {}", format_duration(job.duration_ms));
    let report = job.result?;

    let exported = match &cli.export {
        Some(path) => Some(export_signals(path, &report, &series)?),
        None => None,
    };

    let mut out = if cli.json {
        report::render_json(&report)?
    } else {
        let top = (cli.top > 0).then_some(cli.top);
        report::render_text(&report, cli.sort, cli.reverse, top)
    };

    // Keep JSON output parseable; the export note goes to the log instead.
    if let (Some(path), Some(pair)) = (&cli.export, exported) {
        log::info!("Wrote signals for {} to {:?}", pair, path);
        if !cli.json {
            out.push_str(&format!("\nSignals for {} written to {}\n", pair, path.display()));
        }
    }
    Ok(out)
}

/// The `--pair` drill-down if there is one, otherwise the best pair's records.
fn export_signals(path: &Path, report: &AnalysisReport, series: &PriceSeries) -> Result<WindowPair> {
    let drill = match &report.drill_down {
        Some(drill) => drill.clone(),
        None => {
            if !report.outcome.has_valid_combinations() {
                bail!("Nothing to export: the sweep had no valid window pairs");
            }
            let pair = report.outcome.best_pair;
            DrillDown {
                pair,
                records: generate_signals(series, pair.short, pair.long),
            }
        }
    };

    report::write_signals_csv(path, &drill)?;
    Ok(drill.pair)
}

/// CSV when asked for, otherwise Yahoo behind the SQLite cache (unless disabled).
async fn build_provider(cli: &Cli) -> Result<Box<dyn PriceSeriesProvider>> {
    if let Some(path) = &cli.csv {
        return Ok(Box::new(CsvFileProvider::new(path)));
    }

    let yahoo = YahooProvider::new(YAHOO)?;
    if cli.no_cache {
        return Ok(Box::new(yahoo));
    }

    let db_path = cli.cache_path.clone().unwrap_or_else(price_cache_path);
    match open_storage(&db_path).await {
        Ok(storage) => Ok(Box::new(CachedProvider::new(yahoo, storage, cli.prefer_api))),
        Err(e) => {
            log::warn!("Price cache unavailable ({:#}). Continuing without it.", e);
            Ok(Box::new(yahoo))
        }
    }
}

async fn open_storage(db_path: &std::path::Path) -> Result<Arc<dyn PriceStorage>> {
    let storage = SqliteStorage::new(db_path)
        .await
        .with_context(|| format!("Failed to open {:?}", db_path))?;
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Poll the worker, turning the first Ctrl-C into a cancel request.
async fn wait_for_result(engine: &mut SweepEngine) -> Result<JobResult> {
    let mut cancel_sent = false;
    loop {
        if let Some(job) = engine.try_recv_result()? {
            return Ok(job);
        }

        tokio::select! {
            signal = tokio::signal::ctrl_c(), if !cancel_sent => {
                signal.context("Failed to listen for Ctrl-C")?;
                log::warn!("Ctrl-C received. Cancelling sweep...");
                engine.cancel_all();
                cancel_sent = true;
            }
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
    }
}

use {
    crate::{
        config::DF,
        data::{PriceSeriesProvider, PriceStorage, finish_series},
        domain::PriceSeries,
        error::AnalysisResult,
        utils::TimeUtils,
    },
    async_trait::async_trait,
    chrono::{Days, NaiveDate},
    std::sync::Arc,
};

/// Read-through SQLite cache in front of another provider.
///
/// Cache trouble is never fatal: storage errors are logged and the request
/// goes to the inner provider as if the cache were empty.
pub struct CachedProvider<P> {
    inner: P,
    storage: Arc<dyn PriceStorage>,
    /// Ask the inner provider first; the cache only answers when it fails.
    prefer_api: bool,
}

impl<P: PriceSeriesProvider> CachedProvider<P> {
    pub fn new(inner: P, storage: Arc<dyn PriceStorage>, prefer_api: bool) -> Self {
        Self {
            inner,
            storage,
            prefer_api,
        }
    }

    async fn from_cache(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Option<PriceSeries> {
        match self.storage.covers(ticker, start, end).await {
            Ok(true) => {}
            Ok(false) => {
                if DF.log_price_cache {
                    log::info!("CACHE: miss for {} ({} .. {})", ticker, start, end);
                }
                return None;
            }
            Err(e) => {
                log::warn!("CACHE: coverage lookup failed for {}: {:#}", ticker, e);
                return None;
            }
        }

        let points = match self.storage.load_prices(ticker, start, end).await {
            Ok(points) => points,
            Err(e) => {
                log::warn!("CACHE: load failed for {}: {:#}", ticker, e);
                return None;
            }
        };

        // A covered range with no rows (e.g. a holiday week) is a real answer,
        // but finish_series reports it as unavailable; let the source decide.
        let series = finish_series(ticker, points).ok()?;
        if DF.log_price_cache {
            log::info!("CACHE: hit for {} ({} rows)", ticker, series.len());
        }
        Some(series)
    }

    async fn store(&self, ticker: &str, start: NaiveDate, end: NaiveDate, series: &PriceSeries) {
        if let Err(e) = self.storage.insert_prices(ticker, series.points()).await {
            log::warn!("CACHE: failed to store {} rows for {}: {:#}", series.len(), ticker, e);
            return;
        }

        // Today's bar may still move; only mark settled days as covered.
        let settled_end = TimeUtils::today()
            .checked_sub_days(Days::new(1))
            .map_or(end, |yesterday| end.min(yesterday));
        if settled_end < start {
            return;
        }

        match self.storage.record_fetch(ticker, start, settled_end).await {
            Ok(()) => {
                if DF.log_price_cache {
                    log::info!(
                        "CACHE: stored {} rows for {} ({} .. {})",
                        series.len(),
                        ticker,
                        start,
                        settled_end
                    );
                }
            }
            Err(e) => log::warn!("CACHE: failed to record fetch for {}: {:#}", ticker, e),
        }
    }
}

#[async_trait]
impl<P: PriceSeriesProvider> PriceSeriesProvider for CachedProvider<P> {
    fn signature(&self) -> &'static str {
        self.inner.signature()
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalysisResult<PriceSeries> {
        if !self.prefer_api {
            if let Some(series) = self.from_cache(ticker, start, end).await {
                return Ok(series);
            }
        }

        match self.inner.fetch_series(ticker, start, end).await {
            Ok(series) => {
                self.store(ticker, start, end, &series).await;
                Ok(series)
            }
            Err(e) if self.prefer_api => {
                log::warn!("{} failed ({}). Falling back to cache.", self.inner.signature(), e);
                match self.from_cache(ticker, start, end).await {
                    Some(series) => Ok(series),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}

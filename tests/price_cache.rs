use async_trait::async_trait;
use chrono::NaiveDate;
use sma_sweep::data::{CachedProvider, PriceSeriesProvider, PriceStorage, SqliteStorage};
use sma_sweep::{AnalysisError, AnalysisResult, PricePoint, PriceSeries};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 3, d).unwrap()
}

async fn storage(dir: &TempDir) -> Arc<SqliteStorage> {
    let storage = SqliteStorage::new(dir.path().join("cache").join("closes.sqlite"))
        .await
        .unwrap();
    storage.initialize().await.unwrap();
    Arc::new(storage)
}

/// Serves a fixed March 2023 series and counts calls. Clones share counters.
#[derive(Clone, Default)]
struct FakeSource {
    calls: Arc<AtomicUsize>,
    down: Arc<AtomicBool>,
}

impl FakeSource {
    fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceSeriesProvider for FakeSource {
    fn signature(&self) -> &'static str {
        "fake"
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalysisResult<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(AnalysisError::unavailable(ticker, "source down"));
        }
        let points = (1..=31)
            .map(|d| PricePoint::new(day(d), 100.0 + d as f64))
            .filter(|p| p.date >= start && p.date <= end)
            .collect();
        PriceSeries::new(ticker, points)
    }
}

#[tokio::test]
async fn storage_round_trip_with_replace() {
    let dir = TempDir::new().unwrap();
    let db = storage(&dir).await;

    let first = vec![PricePoint::new(day(1), 10.0), PricePoint::new(day(2), 11.0)];
    assert_eq!(db.insert_prices("SPY", &first).await.unwrap(), 2);

    // revised close for day 2 replaces the stored one
    db.insert_prices("SPY", &[PricePoint::new(day(2), 11.5), PricePoint::new(day(3), 12.0)])
        .await
        .unwrap();
    db.insert_prices("QQQ", &[PricePoint::new(day(2), 99.0)]).await.unwrap();

    let loaded = db.load_prices("SPY", day(2), day(3)).await.unwrap();
    assert_eq!(
        loaded,
        vec![PricePoint::new(day(2), 11.5), PricePoint::new(day(3), 12.0)]
    );
    assert!(db.insert_prices("SPY", &[]).await.unwrap() == 0);
}

#[tokio::test]
async fn coverage_requires_a_containing_fetch() {
    let dir = TempDir::new().unwrap();
    let db = storage(&dir).await;

    assert!(!db.covers("SPY", day(5), day(10)).await.unwrap());
    db.record_fetch("SPY", day(1), day(20)).await.unwrap();

    assert!(db.covers("SPY", day(5), day(10)).await.unwrap());
    assert!(db.covers("SPY", day(1), day(20)).await.unwrap());
    assert!(!db.covers("SPY", day(15), day(25)).await.unwrap());
    assert!(!db.covers("QQQ", day(5), day(10)).await.unwrap());
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::new();
    let cached = CachedProvider::new(source.clone(), storage(&dir).await, false);

    let a = cached.fetch_series("SPY", day(1), day(10)).await.unwrap();
    let b = cached.fetch_series("SPY", day(3), day(8)).await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.len(), 10);
    assert_eq!(b.prices(), a.prices()[2..8].to_vec());
}

#[tokio::test]
async fn prefer_api_falls_back_to_cache_when_source_fails() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::new();
    let cached = CachedProvider::new(source.clone(), storage(&dir).await, true);

    let fresh = cached.fetch_series("SPY", day(1), day(15)).await.unwrap();
    let again = cached.fetch_series("SPY", day(1), day(15)).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);

    source.down.store(true, Ordering::SeqCst);
    let fallback = cached.fetch_series("SPY", day(1), day(15)).await.unwrap();
    assert_eq!(fallback, fresh);
    assert_eq!(again, fresh);

    // nothing cached for this ticker: the source error comes through
    let err = cached.fetch_series("QQQ", day(1), day(15)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
}

use {
    crate::{
        config::{DF, YahooApiConfig},
        data::{PriceSeriesProvider, finish_series},
        domain::{PricePoint, PriceSeries},
        error::{AnalysisError, AnalysisResult},
    },
    anyhow::{Context, Result, anyhow, bail},
    async_trait::async_trait,
    chrono::{DateTime, Days, NaiveDate},
    reqwest::{StatusCode, Url},
    serde::Deserialize,
    std::time::Duration,
};

// --- Chart endpoint response (only the parts we read) ---

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily closes from the Yahoo Finance chart API.
pub struct YahooProvider {
    client: reqwest::Client,
    config: YahooApiConfig,
}

impl YahooProvider {
    pub fn new(config: YahooApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// The ticker becomes one escaped path segment ("BRK/B" stays one symbol).
    fn chart_url(&self, ticker: &str) -> Result<Url> {
        let mut url = Url::parse(self.config.base_url)
            .with_context(|| format!("Bad chart base URL '{}'", self.config.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Chart base URL '{}' cannot take a path", self.config.base_url))?
            .pop_if_empty()
            .push(ticker);
        Ok(url)
    }

    /// Yahoo's `period2` is exclusive, so ask for midnight after `end`.
    async fn request_once(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let period1 = midnight_utc_secs(start);
        let period2 = midnight_utc_secs(end.checked_add_days(Days::new(1)).unwrap_or(end));

        let url = self.chart_url(ticker).map_err(FetchError::Fatal)?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.into()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FetchError::Transient(anyhow::anyhow!("HTTP {}", status)));
        }

        // 404 still carries a chart.error body worth reporting
        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| {
                FetchError::Fatal(anyhow::Error::new(e).context(format!("HTTP {}", status)))
            })?;

        parse_chart(body).map_err(FetchError::Fatal)
    }
}

enum FetchError {
    /// Worth another attempt (network, throttling, 5xx).
    Transient(anyhow::Error),
    Fatal(anyhow::Error),
}

fn midnight_utc_secs(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn parse_chart(body: ChartResponse) -> Result<Vec<PricePoint>> {
    if let Some(err) = body.chart.error {
        bail!("{}: {}", err.code, err.description);
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        bail!("empty chart result");
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        bail!(
            "timestamp/close length mismatch ({} vs {})",
            result.timestamp.len(),
            closes.len()
        );
    }

    // Timestamps are session opens in UTC; shift into exchange time for the date.
    let offset = result.meta.gmtoffset;
    let points = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PricePoint::new(date, close?))
        })
        .collect();

    Ok(points)
}

#[async_trait]
impl PriceSeriesProvider for YahooProvider {
    fn signature(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalysisResult<PriceSeries> {
        let mut attempt = 0;
        loop {
            match self.request_once(ticker, start, end).await {
                Ok(points) => {
                    if DF.log_provider {
                        log::info!(
                            "YAHOO: {} rows for {} ({} .. {})",
                            points.len(),
                            ticker,
                            start,
                            end
                        );
                    }
                    return finish_series(ticker, points);
                }
                Err(FetchError::Transient(e)) if attempt < self.config.retries => {
                    attempt += 1;
                    let wait = Duration::from_millis(self.config.backoff_ms * attempt as u64);
                    log::warn!(
                        "YAHOO: {} attempt {}/{} failed ({:#}). Retrying in {:.1}s...",
                        ticker,
                        attempt,
                        self.config.retries,
                        e,
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(FetchError::Transient(e)) | Err(FetchError::Fatal(e)) => {
                    return Err(AnalysisError::unavailable(ticker, format!("{:#}", e)));
                }
            }
        }
    }
}

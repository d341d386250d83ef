use {
    crate::{
        config::DF,
        data::{PriceSeriesProvider, finish_series},
        domain::{PricePoint, PriceSeries},
        error::{AnalysisError, AnalysisResult},
        utils::time_utils::TimeUtils,
    },
    anyhow::{Context, Result, anyhow, bail},
    async_trait::async_trait,
    chrono::NaiveDate,
    std::path::{Path, PathBuf},
};

/// Header names to read. Matching ignores case and surrounding whitespace.
#[derive(Debug, Clone)]
pub struct CsvColumns {
    pub date: String,
    /// Tried in order; the first present header wins.
    pub close: Vec<String>,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            close: vec!["Close".to_string(), "Adj Close".to_string()],
        }
    }
}

/// Daily closes from a local CSV export (Yahoo download layout by default).
///
/// The ticker is only a label here; the file holds one instrument.
pub struct CsvFileProvider {
    path: PathBuf,
    columns: CsvColumns,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: CsvColumns::default(),
        }
    }

    pub fn with_columns(mut self, columns: CsvColumns) -> Self {
        self.columns = columns;
        self
    }
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
}

/// Dates may carry a time suffix ("2024-01-02 00:00:00-05:00"); only the day counts.
fn parse_day(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, TimeUtils::STANDARD_TIME_FORMAT)
        .with_context(|| format!("unparseable date '{}'", raw))
}

fn read_points(
    path: &Path,
    columns: &CsvColumns,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PricePoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let headers = reader.headers()?.clone();
    let date_idx = find_column(&headers, &columns.date)
        .ok_or_else(|| anyhow!("no '{}' column in {:?}", columns.date, path))?;
    let Some(close_idx) = columns.close.iter().find_map(|c| find_column(&headers, c)) else {
        bail!("none of {:?} found in {:?}", columns.close, path);
    };

    let mut points = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("row {}", line + 2))?;

        let date = parse_day(record.get(date_idx).unwrap_or_default())
            .with_context(|| format!("row {}", line + 2))?;
        if date < start || date > end {
            continue;
        }

        // "null" / blank closes show up on non-trading rows; treat as missing.
        let price = record
            .get(close_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);

        points.push(PricePoint::new(date, price));
    }

    Ok(points)
}

#[async_trait]
impl PriceSeriesProvider for CsvFileProvider {
    fn signature(&self) -> &'static str {
        "CSV file"
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalysisResult<PriceSeries> {
        let path = self.path.clone();
        let columns = self.columns.clone();

        let points = tokio::task::spawn_blocking(move || read_points(&path, &columns, start, end))
            .await
            .map_err(|e| AnalysisError::unavailable(ticker, e))?
            .map_err(|e| AnalysisError::unavailable(ticker, format!("{:#}", e)))?;

        if DF.log_provider {
            log::info!(
                "CSV: {} rows for {} from {:?} ({} .. {})",
                points.len(),
                ticker,
                self.path,
                start,
                end
            );
        }

        finish_series(ticker, points)
    }
}

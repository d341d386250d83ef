use {
    crate::{domain::PricePoint, utils::time_utils::TimeUtils},
    anyhow::{Context, Result},
    async_trait::async_trait,
    chrono::NaiveDate,
    sqlx::{
        ConnectOptions, Pool, QueryBuilder, Row, Sqlite,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    },
    std::{path::Path, str::FromStr, time::Duration},
};

/// Local store of daily closes plus a record of which date ranges were fully fetched.
///
/// Dates are stored as `YYYY-MM-DD` text, which sorts the same as the dates themselves.
#[async_trait]
pub trait PriceStorage: Send + Sync {
    async fn initialize(&self) -> Result<()>;
    /// True when a previous fetch for `symbol` covered all of `start..=end`.
    async fn covers(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<bool>;
    async fn record_fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<()>;
    async fn insert_prices(&self, symbol: &str, points: &[PricePoint]) -> Result<u64>;
    async fn load_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>>;
}

pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

impl SqliteStorage {
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create cache directory {:?}", dir))?;
        }

        let connection_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(60))
                .synchronous(SqliteSynchronous::Normal)
                .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await?;

        Ok(Self { pool })
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(TimeUtils::STANDARD_TIME_FORMAT).to_string()
}

#[async_trait]
impl PriceStorage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS closes (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL NOT NULL,
                PRIMARY KEY (symbol, date)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fetches (
                symbol TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                PRIMARY KEY (symbol, start_date, end_date)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn covers(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as hits
            FROM fetches
            WHERE symbol = ? AND start_date <= ? AND end_date >= ?
            "#,
        )
        .bind(symbol)
        .bind(date_key(start))
        .bind(date_key(end))
        .fetch_one(&self.pool)
        .await?;

        let hits: i64 = row.try_get("hits")?;
        Ok(hits > 0)
    }

    async fn record_fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO fetches (symbol, start_date, end_date) VALUES (?, ?, ?)")
            .bind(symbol)
            .bind(date_key(start))
            .bind(date_key(end))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Upserts in chunks of 3000 rows to stay within SQLite's parameter limit.
    /// A re-fetched date replaces the stored close (vendors revise history).
    async fn insert_prices(&self, symbol: &str, points: &[PricePoint]) -> Result<u64> {
        if points.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for chunk in points.chunks(3000) {
            let mut query_builder =
                QueryBuilder::new("INSERT OR REPLACE INTO closes (symbol, date, close) ");

            query_builder.push_values(chunk, |mut b, p| {
                b.push_bind(symbol)
                    .push_bind(date_key(p.date))
                    .push_bind(p.price);
            });

            query_builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(points.len() as u64)
    }

    async fn load_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let rows = sqlx::query(
            r#"
            SELECT date, close
            FROM closes
            WHERE symbol = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            "#,
        )
        .bind(symbol)
        .bind(date_key(start))
        .bind(date_key(end))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let date: String = row.try_get("date")?;
                let date = NaiveDate::parse_from_str(&date, TimeUtils::STANDARD_TIME_FORMAT)
                    .with_context(|| format!("Bad date '{}' in cache for {}", date, symbol))?;
                Ok(PricePoint::new(date, row.try_get("close")?))
            })
            .collect()
    }
}

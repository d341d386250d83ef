mod cached;
mod csv_file;
mod provider;
mod storage;
mod yahoo;

pub use {
    cached::CachedProvider,
    csv_file::{CsvColumns, CsvFileProvider},
    provider::PriceSeriesProvider,
    storage::{PriceStorage, SqliteStorage},
    yahoo::YahooProvider,
};

pub(crate) use provider::finish_series;

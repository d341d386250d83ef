//! File persistence configuration
use std::path::PathBuf;

/// Configuration for the local closing-price cache
pub struct PriceCacheConfig {
    /// Directory path for storing the cache database
    pub directory: &'static str,
    /// SQLite filename inside `directory`
    pub filename: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub prices: PriceCacheConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    prices: PriceCacheConfig {
        directory: "price_data",
        filename: "closes.sqlite",
    },
};

/// Example: "price_data/closes.sqlite"
pub fn price_cache_path() -> PathBuf {
    PathBuf::from(PERSISTENCE.prices.directory).join(PERSISTENCE.prices.filename)
}

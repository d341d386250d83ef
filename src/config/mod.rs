//! Configuration module for the SMA sweep application.

// Can all be private now because we have a public re-export.
mod debug;
mod persistence;
mod sweep;
mod yahoo;

// Re-export commonly used items
pub use debug::DF;
pub use persistence::{PERSISTENCE, price_cache_path};
pub use sweep::{SWEEP, SweepConfig};
pub use yahoo::{YAHOO, YahooApiConfig};

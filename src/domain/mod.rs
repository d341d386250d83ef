// Domain types and value objects
mod price_series;
mod window_range;

// Re-export commonly used types to the world
pub use price_series::{PricePoint, PriceSeries};
pub use window_range::{WindowPair, WindowRange};

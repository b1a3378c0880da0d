//! Data module - CSV loading, metric derivation, filtering and export

mod cache;
pub mod columns;
pub mod export;
pub mod filters;
mod loader;
mod processor;

pub use cache::TtlCache;
pub use filters::{DateRange, PostFilter};
pub use loader::{fetch_posts, parse_posts, parse_timestamp, CsvSource, DataLoader, HttpCsvSource};
pub use processor::{derive_metrics, engagement, engagement_rate, interactions};

//! Social Pulse - engagement dashboard over a CSV snapshot of social posts.
//!
//! The snapshot is fetched over HTTP, cached for a fixed window, enriched with
//! derived metrics and filtered on demand. Every display is recomputed from
//! the cached table and the current filter settings.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod gui;
pub mod stats;

//! Error types shared across the loader, pipeline, renderer and export layers.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while fetching or parsing the CSV snapshot.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} returned an empty body")]
    EmptyResponse { url: String },
    #[error("Failed to read CSV records: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to load CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Errors raised by metric derivation, filters and aggregations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Errors raised while rendering static images.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Nothing to render: {0}")]
    Empty(&'static str),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Errors raised while writing the filtered CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! CSV Data Loader Module
//! Fetches the post snapshot, parses it with Polars and memoises the result per URL.

use crate::data::cache::TtlCache;
use crate::data::columns::{self, DATE, SIGNAL_COLUMNS};
use crate::data::processor::derive_metrics;
use crate::error::LoaderError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const USER_AGENT: &str = "social-pulse/0.1 (dashboard)";

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const ZONED_FORMATS: [&str; 2] = ["%a %b %d %H:%M:%S %z %Y", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];

/// Anything that can hand back CSV text for a URL.
pub trait CsvSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, LoaderError>;
}

/// Fetches CSV exports over HTTP.
pub struct HttpCsvSource {
    client: reqwest::blocking::Client,
}

impl HttpCsvSource {
    /// # Errors
    ///
    /// Returns [`LoaderError::Http`] if the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl CsvSource for HttpCsvSource {
    fn fetch(&self, url: &str) -> Result<String, LoaderError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        if body.trim().is_empty() {
            return Err(LoaderError::EmptyResponse {
                url: url.to_string(),
            });
        }
        Ok(body)
    }
}

/// Parse a date cell; unparseable or blank values give `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    for format in ZONED_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.naive_utc());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Re-emit the CSV keeping only records whose field count matches the header.
fn drop_malformed_rows(text: &str) -> Result<(Vec<u8>, usize), LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    let mut skipped = 0;
    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            skipped += 1;
            continue;
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok((bytes, skipped))
}

/// Parse CSV text into the post table: malformed rows dropped, `Date`
/// coerced to a datetime, signal columns present as zero-filled integers.
///
/// # Errors
///
/// Fails only when the text is not CSV at all.
pub fn parse_posts(text: &str) -> Result<DataFrame, LoaderError> {
    let (clean, skipped) = drop_malformed_rows(text)?;
    if skipped > 0 {
        warn!(skipped, "dropped malformed CSV rows");
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .into_reader_with_file_handle(Cursor::new(clean))
        .finish()?;

    normalize(df)
}

fn normalize(mut df: DataFrame) -> Result<DataFrame, LoaderError> {
    let height = df.height();

    if let Some(raw) = columns::text_values(&df, DATE)? {
        let parsed: Vec<Option<NaiveDateTime>> = raw
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_timestamp))
            .collect();
        let unparseable = raw
            .iter()
            .zip(&parsed)
            .filter(|(cell, ts)| {
                cell.as_deref().is_some_and(|c| !c.trim().is_empty()) && ts.is_none()
            })
            .count();
        if unparseable > 0 {
            warn!(unparseable, "Date values could not be parsed and were set to null");
        }
        df.with_column(columns::date_column(&parsed)?)?;
    }

    for name in SIGNAL_COLUMNS {
        let values = columns::int_values(&df, name)?.unwrap_or_else(|| {
            debug!(column = name, "signal column missing, filling with zeros");
            vec![0; height]
        });
        df.with_column(Column::new(name.into(), values))?;
    }

    Ok(df)
}

/// Fetch, parse and derive metrics for one URL, bypassing the cache.
///
/// # Errors
///
/// Propagates network, CSV and derivation failures.
pub fn fetch_posts(source: &dyn CsvSource, url: &str) -> Result<DataFrame, LoaderError> {
    info!(url, "fetching post snapshot");
    let text = source.fetch(url)?;
    let df = parse_posts(&text)?;
    let df = derive_metrics(&df)?;
    info!(rows = df.height(), columns = df.width(), "post snapshot loaded");
    Ok(df)
}

/// Memoised post loader: one fetch per URL per cache window.
pub struct DataLoader {
    source: Arc<dyn CsvSource>,
    cache: TtlCache<String, DataFrame>,
}

impl DataLoader {
    pub fn new(source: Arc<dyn CsvSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// Shared handle to the source, for fetching off the UI thread.
    pub fn source(&self) -> Arc<dyn CsvSource> {
        Arc::clone(&self.source)
    }

    /// Return the table for `url`, fetching only when nothing live is cached.
    ///
    /// # Errors
    ///
    /// Propagates [`fetch_posts`] failures; the cache is left unchanged.
    pub fn load(&mut self, url: &str, now: Instant) -> Result<DataFrame, LoaderError> {
        self.cache.purge_expired(now);
        let source = &self.source;
        self.cache
            .get_or_try_insert_with(url.to_string(), now, || fetch_posts(source.as_ref(), url))
    }

    /// Live cached table for `url`, if any.
    pub fn cached(&self, url: &str, now: Instant) -> Option<DataFrame> {
        self.cache.get(&url.to_string(), now).cloned()
    }

    /// Store a table fetched elsewhere (e.g. on a background thread).
    /// Expired snapshots of other URLs are dropped at the same time.
    pub fn store(&mut self, url: &str, df: DataFrame, now: Instant) {
        self.cache.purge_expired(now);
        self.cache.insert(url.to_string(), df, now);
        debug!(url, entries = self.cache.len(), "snapshot stored");
    }

    pub fn invalidate(&mut self, url: &str) {
        self.cache.invalidate(&url.to_string());
    }
}

//! Runtime configuration: command-line flags with environment fallbacks.
//!
//! `.env` files are loaded by the binary before parsing, so every flag below
//! can also be supplied through its `SOCIAL_PULSE_*` variable.

use crate::dashboard::{DashboardRequest, DEFAULT_BEST_POSTS};
use crate::data::filters::{date_bounds, default_min_views};
use crate::data::{DateRange, PostFilter};
use crate::error::PipelineError;
use crate::stats::tokens::TOP_TOKENS;
use chrono::NaiveDate;
use clap::Args;
use polars::prelude::DataFrame;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/\
1V6Jtz-mMtltQKhaslIQRZ-AtHGaVo0Fy58KtLAzgKtg/export?format=csv&gid=0";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Bounds of the best-posts row slider.
pub const BEST_POSTS_RANGE: std::ops::RangeInclusive<usize> = 5..=50;

#[derive(Debug, Clone, Args)]
pub struct DashboardConfig {
    /// CSV export URL of the shared spreadsheet.
    #[arg(long, env = "SOCIAL_PULSE_CSV_URL", default_value = DEFAULT_CSV_URL, global = true)]
    pub csv_url: String,

    /// How long a fetched snapshot stays fresh.
    #[arg(long, env = "SOCIAL_PULSE_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS, global = true)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = "SOCIAL_PULSE_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS, global = true)]
    pub http_timeout_secs: u64,

    /// Rows in the hashtag and mention tables.
    #[arg(long = "top-n", default_value_t = TOP_TOKENS, global = true)]
    pub top_tokens: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_url: DEFAULT_CSV_URL.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            top_tokens: TOP_TOKENS,
        }
    }
}

impl DashboardConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Filter flags for the headless commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Keep only these authors; repeat for several.
    #[arg(long = "author")]
    pub authors: Vec<String>,

    /// Minimum views; defaults to the median of the loaded table.
    #[arg(long)]
    pub min_views: Option<i64>,

    /// Case-insensitive substring to look for in Content.
    #[arg(long, default_value = "")]
    pub keyword: String,

    /// Restrict trend and best posts to one author.
    #[arg(long)]
    pub drill_author: Option<String>,

    #[arg(long, default_value_t = DEFAULT_BEST_POSTS)]
    pub best_posts: usize,
}

impl FilterArgs {
    /// Resolve the flags against the loaded table. A single date bound is
    /// completed from the table's own date bounds, or left open when no date
    /// parsed; either way undated rows are dropped once a flag is given.
    pub fn to_request(&self, table: &DataFrame, top_tokens: usize) -> Result<DashboardRequest, PipelineError> {
        let date_range = match (self.start, self.end) {
            (None, None) => None,
            (start, end) => {
                let bounds = date_bounds(table)?;
                if bounds.is_none() {
                    warn!("no post has a parseable date; the date filter keeps nothing dated");
                }
                Some(DateRange::new(
                    start.or(bounds.map(|b| b.start)).unwrap_or(NaiveDate::MIN),
                    end.or(bounds.map(|b| b.end)).unwrap_or(NaiveDate::MAX),
                ))
            }
        };
        let min_views = match self.min_views {
            Some(v) => v,
            None => default_min_views(table)?,
        };

        Ok(DashboardRequest {
            filter: PostFilter {
                date_range,
                authors: self.authors.clone(),
                min_views: Some(min_views),
                keyword: self.keyword.clone(),
            },
            drill_author: self.drill_author.clone(),
            best_posts: self
                .best_posts
                .clamp(*BEST_POSTS_RANGE.start(), *BEST_POSTS_RANGE.end()),
            top_tokens,
        })
    }
}

//! Filter chain over the post table.
//!
//! Each stage returns a new frame with the same schema and becomes the
//! identity when its constraint is empty or its column is absent.

use crate::data::columns::{self, AUTHOR, CONTENT, VIEWS};
use crate::error::PipelineError;
use crate::stats::StatsCalculator;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether the timestamp's calendar day lies within the range.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let day = ts.date();
        day >= self.start && day <= self.end
    }
}

/// User-resolved filter constraints, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub date_range: Option<DateRange>,
    pub authors: Vec<String>,
    pub min_views: Option<i64>,
    pub keyword: String,
}

impl PostFilter {
    /// Run the whole chain: date range, authors, minimum views, keyword.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame, PipelineError> {
        let out = filter_date_range(df, self.date_range.as_ref())?;
        let out = filter_authors(&out, &self.authors)?;
        let out = filter_min_views(&out, self.min_views)?;
        let out = filter_keyword(&out, &self.keyword)?;
        debug!(before = df.height(), after = out.height(), "filters applied");
        Ok(out)
    }
}

/// Keep rows dated within `range`; null dates drop out once a range is set.
pub fn filter_date_range(
    df: &DataFrame,
    range: Option<&DateRange>,
) -> Result<DataFrame, PipelineError> {
    let Some(range) = range else {
        return Ok(df.clone());
    };
    let Some(dates) = columns::date_values(df)? else {
        return Ok(df.clone());
    };
    let keep: Vec<bool> = dates
        .iter()
        .map(|ts| ts.is_some_and(|ts| range.contains(ts)))
        .collect();
    Ok(columns::filter_rows(df, &keep)?)
}

/// Keep rows whose author is selected; an empty selection keeps everything.
pub fn filter_authors(df: &DataFrame, selected: &[String]) -> Result<DataFrame, PipelineError> {
    if selected.is_empty() {
        return Ok(df.clone());
    }
    let Some(authors) = columns::text_values(df, AUTHOR)? else {
        return Ok(df.clone());
    };
    let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let keep: Vec<bool> = authors
        .iter()
        .map(|a| a.as_deref().is_some_and(|a| selected.contains(a)))
        .collect();
    Ok(columns::filter_rows(df, &keep)?)
}

/// Keep rows with `Views >= threshold`.
pub fn filter_min_views(df: &DataFrame, threshold: Option<i64>) -> Result<DataFrame, PipelineError> {
    let Some(threshold) = threshold else {
        return Ok(df.clone());
    };
    let Some(views) = columns::int_values(df, VIEWS)? else {
        return Ok(df.clone());
    };
    let keep: Vec<bool> = views.iter().map(|&v| v >= threshold).collect();
    Ok(columns::filter_rows(df, &keep)?)
}

/// Case-insensitive substring match on `Content`; null content never matches.
pub fn filter_keyword(df: &DataFrame, query: &str) -> Result<DataFrame, PipelineError> {
    if query.is_empty() {
        return Ok(df.clone());
    }
    let Some(content) = columns::text_values(df, CONTENT)? else {
        return Ok(df.clone());
    };
    let needle = query.to_lowercase();
    let keep: Vec<bool> = content
        .iter()
        .map(|c| c.as_deref().is_some_and(|c| c.to_lowercase().contains(&needle)))
        .collect();
    Ok(columns::filter_rows(df, &keep)?)
}

/// Median of `Views`, truncated; used as the initial threshold.
pub fn default_min_views(df: &DataFrame) -> Result<i64, PipelineError> {
    let Some(views) = columns::int_values(df, VIEWS)? else {
        return Ok(0);
    };
    let values: Vec<f64> = views.iter().map(|&v| v as f64).collect();
    Ok(StatsCalculator::median(&values).map_or(0, |m| m as i64))
}

/// Largest `Views` value, the slider's upper bound.
pub fn max_views(df: &DataFrame) -> Result<i64, PipelineError> {
    Ok(columns::int_values(df, VIEWS)?
        .and_then(|v| v.into_iter().max())
        .unwrap_or(0))
}

/// Sorted distinct non-null authors.
pub fn author_options(df: &DataFrame) -> Result<Vec<String>, PipelineError> {
    let Some(authors) = columns::text_values(df, AUTHOR)? else {
        return Ok(Vec::new());
    };
    let unique: BTreeSet<String> = authors.into_iter().flatten().collect();
    Ok(unique.into_iter().collect())
}

/// Earliest and latest calendar day present, if any date parsed.
pub fn date_bounds(df: &DataFrame) -> Result<Option<DateRange>, PipelineError> {
    let Some(dates) = columns::date_values(df)? else {
        return Ok(None);
    };
    let days = dates.iter().flatten().map(NaiveDateTime::date);
    let bounds = days.fold(None, |acc: Option<DateRange>, day| match acc {
        None => Some(DateRange::new(day, day)),
        Some(r) => Some(DateRange::new(r.start.min(day), r.end.max(day))),
    });
    Ok(bounds)
}

//! Metric Derivation Module
//! Adds Interactions, Engagement and ER columns to a post table.

use crate::data::columns::{self, ENGAGEMENT, ER, INTERACTIONS, LIKES, QUOTES, REPLIES, RETWEETS, VIEWS};
use crate::error::PipelineError;
use polars::prelude::*;

/// Likes + Retweets + Replies + Quotes.
pub fn interactions(likes: i64, retweets: i64, replies: i64, quotes: i64) -> i64 {
    likes + retweets + replies + quotes
}

/// Interactions plus raw views.
pub fn engagement(interactions: i64, views: i64) -> i64 {
    interactions + views
}

/// Interactions per view; `None` when there are no views.
pub fn engagement_rate(interactions: i64, views: i64) -> Option<f64> {
    if views == 0 {
        None
    } else {
        Some(interactions as f64 / views as f64)
    }
}

/// Return a copy of `df` with the derived metric columns added (or replaced).
/// Missing signal columns count as zero.
pub fn derive_metrics(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let height = df.height();
    let signal = |name: &str| -> PolarsResult<Vec<i64>> {
        Ok(columns::int_values(df, name)?.unwrap_or_else(|| vec![0; height]))
    };

    let likes = signal(LIKES)?;
    let retweets = signal(RETWEETS)?;
    let replies = signal(REPLIES)?;
    let quotes = signal(QUOTES)?;
    let views = signal(VIEWS)?;

    let interaction_values: Vec<i64> = (0..height)
        .map(|i| interactions(likes[i], retweets[i], replies[i], quotes[i]))
        .collect();
    let engagement_values: Vec<i64> = interaction_values
        .iter()
        .zip(&views)
        .map(|(&i, &v)| engagement(i, v))
        .collect();
    let rate_values: Vec<Option<f64>> = interaction_values
        .iter()
        .zip(&views)
        .map(|(&i, &v)| engagement_rate(i, v))
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(INTERACTIONS.into(), interaction_values))?;
    out.with_column(Column::new(ENGAGEMENT.into(), engagement_values))?;
    out.with_column(Column::new(ER.into(), rate_values))?;
    Ok(out)
}

//! Leaderboards, daily trend aggregation and author drilldown.

use crate::data::columns::{
    self, AUTHOR, CONTENT, DATE, ENGAGEMENT, ER, INTERACTIONS, LIKES, QUOTES, REPLIES, RETWEETS,
    URL, VIEWS,
};
use crate::error::PipelineError;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const LEADERBOARD_SIZE: usize = 10;

/// Drilldown choice meaning "no single author".
pub const OVERALL: &str = "(overall)";

/// Columns projected for the best-posts table.
pub const BEST_POST_COLUMNS: [&str; 10] = [
    DATE, AUTHOR, CONTENT, VIEWS, LIKES, RETWEETS, REPLIES, QUOTES, ER, URL,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorScore {
    /// `None` groups posts without an author.
    pub author: Option<String>,
    pub engagement: i64,
    pub posts: usize,
}

impl AuthorScore {
    pub fn display_name(&self) -> &str {
        self.author.as_deref().unwrap_or("(no author)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub views: i64,
    pub interactions: i64,
}

fn engagement_of(df: &DataFrame) -> Result<Vec<i64>, PipelineError> {
    Ok(columns::int_values(df, ENGAGEMENT)?.unwrap_or_else(|| vec![0; df.height()]))
}

/// Sum Engagement per author, descending, first-seen order on ties.
pub fn author_leaderboard(df: &DataFrame, limit: usize) -> Result<Vec<AuthorScore>, PipelineError> {
    let authors = columns::text_values(df, AUTHOR)?.unwrap_or_else(|| vec![None; df.height()]);
    let engagement = engagement_of(df)?;

    let mut scores: Vec<AuthorScore> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();
    for (author, value) in authors.into_iter().zip(engagement) {
        let slot = *index.entry(author.clone()).or_insert_with(|| {
            scores.push(AuthorScore {
                author,
                engagement: 0,
                posts: 0,
            });
            scores.len() - 1
        });
        scores[slot].engagement += value;
        scores[slot].posts += 1;
    }

    scores.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    scores.truncate(limit);
    Ok(scores)
}

/// Top `limit` posts by Engagement, projected to [`BEST_POST_COLUMNS`].
pub fn top_posts(df: &DataFrame, limit: usize) -> Result<DataFrame, PipelineError> {
    let engagement = engagement_of(df)?;
    let mut order: Vec<usize> = (0..engagement.len()).collect();
    order.sort_by(|&a, &b| engagement[b].cmp(&engagement[a]));
    order.truncate(limit);
    let best = columns::take_rows(df, &order)?;
    Ok(columns::project(&best, &BEST_POST_COLUMNS)?)
}

/// Views and Interactions summed per calendar day, ascending.
/// Undated rows are left out.
pub fn daily_trend(df: &DataFrame) -> Result<Vec<TrendPoint>, PipelineError> {
    let Some(dates) = columns::date_values(df)? else {
        return Ok(Vec::new());
    };
    let height = df.height();
    let views = columns::int_values(df, VIEWS)?.unwrap_or_else(|| vec![0; height]);
    let interactions = columns::int_values(df, INTERACTIONS)?.unwrap_or_else(|| vec![0; height]);

    let mut days: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for (i, ts) in dates.iter().enumerate() {
        let Some(ts) = ts else { continue };
        let entry = days.entry(ts.date()).or_insert((0, 0));
        entry.0 += views[i];
        entry.1 += interactions[i];
    }

    Ok(days
        .into_iter()
        .map(|(day, (views, interactions))| TrendPoint {
            day,
            views,
            interactions,
        })
        .collect())
}

/// Restrict to one author's posts; `None` or [`OVERALL`] keeps everything.
pub fn drilldown(df: &DataFrame, author: Option<&str>) -> Result<DataFrame, PipelineError> {
    match author {
        None | Some(OVERALL) => Ok(df.clone()),
        Some(name) => {
            let Some(authors) = columns::text_values(df, AUTHOR)? else {
                return Ok(df.clone());
            };
            let keep: Vec<bool> = authors.iter().map(|a| a.as_deref() == Some(name)).collect();
            Ok(columns::filter_rows(df, &keep)?)
        }
    }
}

//! One rendering pass: every display derived from the loaded table and the
//! user's resolved controls. Nothing here is cached; callers recompute on
//! each interaction.

use crate::data::export::explorer_view;
use crate::data::PostFilter;
use crate::error::PipelineError;
use crate::stats::leaderboard::{self, LEADERBOARD_SIZE};
use crate::stats::tokens::{self, TOP_TOKENS};
use crate::stats::{
    AuthorScore, FilteredSummary, LandingSummary, StatsCalculator, TokenCount, TokenKind,
    TrendPoint,
};
use polars::prelude::DataFrame;
use serde::Serialize;

/// Default row count for the best-posts table.
pub const DEFAULT_BEST_POSTS: usize = 10;

/// Resolved control values for one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub filter: PostFilter,
    /// Single author to drill into; `None` means overall.
    pub drill_author: Option<String>,
    pub best_posts: usize,
    pub top_tokens: usize,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            filter: PostFilter::default(),
            drill_author: None,
            best_posts: DEFAULT_BEST_POSTS,
            top_tokens: TOP_TOKENS,
        }
    }
}

/// Everything the pages display for one pass.
pub struct DashboardPass {
    pub landing: LandingSummary,
    pub summary: FilteredSummary,
    pub hashtags: Vec<TokenCount>,
    pub mentions: Vec<TokenCount>,
    pub authors: Vec<AuthorScore>,
    /// Daily trend of the drilldown view.
    pub trend: Vec<TrendPoint>,
    /// Best posts of the drilldown view.
    pub best_posts: DataFrame,
    pub explorer: DataFrame,
    pub filtered: DataFrame,
}

/// Serializable subset of a pass for headless output.
#[derive(Debug, Serialize)]
pub struct PassReport<'a> {
    pub landing: &'a LandingSummary,
    pub summary: &'a FilteredSummary,
    pub hashtags: &'a [TokenCount],
    pub mentions: &'a [TokenCount],
    pub authors: &'a [AuthorScore],
    pub trend: &'a [TrendPoint],
}

impl DashboardPass {
    pub fn compute(table: &DataFrame, request: &DashboardRequest) -> Result<Self, PipelineError> {
        let filtered = request.filter.apply(table)?;
        let drilled = leaderboard::drilldown(&filtered, request.drill_author.as_deref())?;

        Ok(Self {
            landing: StatsCalculator::landing(table)?,
            summary: StatsCalculator::filtered(&filtered)?,
            hashtags: tokens::top_tokens(&filtered, TokenKind::Hashtag, request.top_tokens)?,
            mentions: tokens::top_tokens(&filtered, TokenKind::Mention, request.top_tokens)?,
            authors: leaderboard::author_leaderboard(&filtered, LEADERBOARD_SIZE)?,
            trend: leaderboard::daily_trend(&drilled)?,
            best_posts: leaderboard::top_posts(&drilled, request.best_posts)?,
            explorer: explorer_view(&filtered)?,
            filtered,
        })
    }

    pub fn report(&self) -> PassReport<'_> {
        PassReport {
            landing: &self.landing,
            summary: &self.summary,
            hashtags: &self.hashtags,
            mentions: &self.mentions,
            authors: &self.authors,
            trend: &self.trend,
        }
    }
}

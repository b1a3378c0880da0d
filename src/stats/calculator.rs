//! Statistics Calculator Module
//! Headline KPI summaries for the overview and filtered views.

use crate::data::columns::{self, ER, INTERACTIONS, LIKES, RETWEETS, VIEWS};
use crate::error::PipelineError;
use polars::prelude::DataFrame;
use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};

/// Totals shown on the landing page, over the unfiltered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LandingSummary {
    pub total_posts: usize,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_retweets: i64,
}

/// KPIs over the current filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilteredSummary {
    pub posts: usize,
    pub views: i64,
    pub interactions: i64,
    /// Mean of the non-null engagement rates.
    pub avg_er: Option<f64>,
}

/// Handles summary calculations over post tables.
pub struct StatsCalculator;

impl StatsCalculator {
    fn column_sum(df: &DataFrame, name: &str) -> Result<i64, PipelineError> {
        Ok(columns::int_values(df, name)?
            .map(|v| v.iter().sum())
            .unwrap_or(0))
    }

    pub fn landing(df: &DataFrame) -> Result<LandingSummary, PipelineError> {
        Ok(LandingSummary {
            total_posts: df.height(),
            total_views: Self::column_sum(df, VIEWS)?,
            total_likes: Self::column_sum(df, LIKES)?,
            total_retweets: Self::column_sum(df, RETWEETS)?,
        })
    }

    pub fn filtered(df: &DataFrame) -> Result<FilteredSummary, PipelineError> {
        let rates: Vec<f64> = columns::float_values(df, ER)?
            .map(|v| v.into_iter().flatten().collect())
            .unwrap_or_default();
        Ok(FilteredSummary {
            posts: df.height(),
            views: Self::column_sum(df, VIEWS)?,
            interactions: Self::column_sum(df, INTERACTIONS)?,
            avg_er: Self::mean(&rates),
        })
    }

    /// Median with linear interpolation between the middle pair.
    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let data = Data::new(values.to_vec());
        Some(data.median())
    }

    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().mean())
    }
}

/// Thousands-separated integer, e.g. `12,345`.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Percentage with two decimals, or an em dash when undefined.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{:.2}%", r * 100.0),
        _ => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{derive_metrics, parse_posts};

    fn table() -> DataFrame {
        let csv = "Author,Likes,Retweets,Replies,Views\na,1,2,1,8\nb,4,0,0,0\nc,0,1,0,2\n";
        derive_metrics(&parse_posts(csv).unwrap()).unwrap()
    }

    #[test]
    fn landing_totals() {
        let summary = StatsCalculator::landing(&table()).unwrap();
        assert_eq!(
            summary,
            LandingSummary {
                total_posts: 3,
                total_views: 10,
                total_likes: 5,
                total_retweets: 3,
            }
        );
    }

    #[test]
    fn filtered_kpis_skip_null_rates() {
        let summary = StatsCalculator::filtered(&table()).unwrap();
        assert_eq!(summary.posts, 3);
        assert_eq!(summary.views, 10);
        assert_eq!(summary.interactions, 9);
        // (4/8 + 1/2) / 2
        let avg = summary.avg_er.unwrap();
        assert!((avg - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_view_has_no_average_rate() {
        let df = table().head(Some(0));
        let summary = StatsCalculator::filtered(&df).unwrap();
        assert_eq!(summary.avg_er, None);
        assert_eq!(format_rate(summary.avg_er), "—");
    }

    #[test]
    fn median_interpolates_even_lengths() {
        assert_eq!(StatsCalculator::median(&[100.0, 0.0, 50.0, 10.0]), Some(30.0));
        assert_eq!(StatsCalculator::median(&[3.0]), Some(3.0));
        assert_eq!(StatsCalculator::median(&[]), None);
    }

    #[test]
    fn formats_counts_and_rates() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(-4_500), "-4,500");
        assert_eq!(format_rate(Some(0.1234)), "12.34%");
    }
}

//! Stats module - KPIs, token counts, leaderboards and word-cloud input

mod calculator;
pub mod leaderboard;
pub mod tokens;
pub mod wordcloud;

pub use calculator::{format_count, format_rate, FilteredSummary, LandingSummary, StatsCalculator};
pub use leaderboard::{AuthorScore, TrendPoint};
pub use tokens::{TokenCount, TokenKind};
pub use wordcloud::{StopWords, WordWeight};

//! Hashtag and mention extraction from post content.

use crate::data::columns::{self, CONTENT};
use crate::error::PipelineError;
use polars::prelude::DataFrame;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Rows shown in each token table.
pub const TOP_TOKENS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Hashtag,
    Mention,
}

impl TokenKind {
    fn pattern(self) -> &'static Regex {
        static HASHTAG: OnceLock<Regex> = OnceLock::new();
        static MENTION: OnceLock<Regex> = OnceLock::new();
        match self {
            TokenKind::Hashtag => HASHTAG.get_or_init(|| Regex::new(r"#\w+").expect("valid regex")),
            TokenKind::Mention => MENTION.get_or_init(|| Regex::new(r"@\w+").expect("valid regex")),
        }
    }

    /// Column header for the token in summary tables.
    pub fn label(self) -> &'static str {
        match self {
            TokenKind::Hashtag => "Hashtag",
            TokenKind::Mention => "Handle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub token: String,
    pub count: usize,
}

/// All tokens of `kind` in `text`, case preserved, in order of appearance.
pub fn extract_tokens(text: &str, kind: TokenKind) -> Vec<String> {
    kind.pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Count tokens across texts. Ties keep first-encountered order.
pub fn count_tokens<'a, I>(texts: I, kind: TokenKind) -> Vec<TokenCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let texts: Vec<Option<&str>> = texts.into_iter().collect();
    let per_row: Vec<Vec<String>> = texts
        .par_iter()
        .map(|text| text.map(|t| extract_tokens(t, kind)).unwrap_or_default())
        .collect();

    let mut counts: Vec<TokenCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for token in per_row.into_iter().flatten() {
        match index.get(&token) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(token.clone(), counts.len());
                counts.push(TokenCount { token, count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Top `limit` tokens of `kind` over the `Content` column.
pub fn top_tokens(
    df: &DataFrame,
    kind: TokenKind,
    limit: usize,
) -> Result<Vec<TokenCount>, PipelineError> {
    let Some(content) = columns::text_values(df, CONTENT)? else {
        return Ok(Vec::new());
    };
    let mut counts = count_tokens(content.iter().map(|c| c.as_deref()), kind);
    counts.truncate(limit);
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_pairs(counts: &[TokenCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.token.as_str(), c.count)).collect()
    }

    #[test]
    fn hashtags_are_case_sensitive() {
        let counts = count_tokens([Some("Hello #Foo world #foo #Bar")], TokenKind::Hashtag);
        assert_eq!(as_pairs(&counts), vec![("#Foo", 1), ("#foo", 1), ("#Bar", 1)]);
    }

    #[test]
    fn null_content_yields_nothing() {
        assert!(count_tokens([None], TokenKind::Hashtag).is_empty());
        assert!(extract_tokens("", TokenKind::Mention).is_empty());
    }

    #[test]
    fn counts_sort_descending_with_stable_ties() {
        let texts = [
            Some("@b hi @a"),
            None,
            Some("@a again and @c"),
            Some("@c @c"),
        ];
        let counts = count_tokens(texts, TokenKind::Mention);
        assert_eq!(as_pairs(&counts), vec![("@c", 3), ("@a", 2), ("@b", 1)]);
    }

    #[test]
    fn mentions_stop_at_non_word_characters() {
        assert_eq!(
            extract_tokens("ping @rust_lang, @tokio-rs!", TokenKind::Mention),
            vec!["@rust_lang", "@tokio"]
        );
    }

    #[test]
    fn top_tokens_truncates_and_tolerates_missing_column() {
        let df = polars::df!("Content" => [Some("#a #b #c"), None, Some("#a")]).unwrap();
        let top = top_tokens(&df, TokenKind::Hashtag, 2).unwrap();
        assert_eq!(as_pairs(&top), vec![("#a", 2), ("#b", 1)]);

        let df = polars::df!("Other" => ["#a"]).unwrap();
        assert!(top_tokens(&df, TokenKind::Hashtag, 15).unwrap().is_empty());
    }
}

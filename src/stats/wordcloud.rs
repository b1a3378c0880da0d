//! Word-cloud input: cleaned-text detection, stop-word removal and word weights.

use crate::data::columns::{self, CLEANED_MARKER};
use crate::error::PipelineError;
use polars::prelude::DataFrame;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

pub const MAX_WORDS: usize = 75;

/// Domain additions on top of the standard English list.
pub const EXTRA_STOP_WORDS: [&str; 4] = ["https", "rt", "tco", "scott"];

/// A word and its frequency relative to the most frequent word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    pub weight: f64,
}

/// Lowercased stop-word set.
#[derive(Debug, Clone)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    /// Standard English stop words plus [`EXTRA_STOP_WORDS`].
    pub fn standard() -> Self {
        let mut words: HashSet<String> = stop_words::get(stop_words::LANGUAGE::English)
            .iter()
            .map(|w| w.to_lowercase())
            .collect();
        words.extend(EXTRA_STOP_WORDS.iter().map(|w| w.to_string()));
        Self(words)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }
}

/// Name of the first column whose name contains "Cleaned".
pub fn cleaned_column(df: &DataFrame) -> Option<String> {
    df.get_column_names()
        .iter()
        .find(|name| name.contains(CLEANED_MARKER))
        .map(|name| name.to_string())
}

/// Non-null cleaned values joined by single spaces; `None` when there is no
/// cleaned column.
pub fn cleaned_text(df: &DataFrame) -> Result<Option<String>, PipelineError> {
    let Some(name) = cleaned_column(df) else {
        return Ok(None);
    };
    let values = columns::text_values(df, &name)?.unwrap_or_default();
    let joined = values.into_iter().flatten().collect::<Vec<_>>().join(" ");
    Ok(Some(joined))
}

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w[\w']+").expect("valid regex"))
}

/// Count words of two or more characters, dropping stop words and bare
/// numbers. Case variants are merged under their most common spelling.
pub fn word_frequencies(text: &str, stop_words: &StopWords, max_words: usize) -> Vec<WordWeight> {
    // key -> (first-seen rank, spelling counts in first-seen order)
    let mut groups: HashMap<String, (usize, Vec<(String, usize)>)> = HashMap::new();

    for m in word_pattern().find_iter(text) {
        let raw = m.as_str();
        let word = raw.strip_suffix("'s").unwrap_or(raw);
        if word.chars().count() < 2 || word.chars().all(|c| c.is_numeric()) {
            continue;
        }
        if stop_words.contains(word) {
            continue;
        }
        let rank = groups.len();
        let (_, spellings) = groups
            .entry(word.to_lowercase())
            .or_insert_with(|| (rank, Vec::new()));
        match spellings.iter_mut().find(|(s, _)| s == word) {
            Some((_, n)) => *n += 1,
            None => spellings.push((word.to_string(), 1)),
        }
    }

    let mut ranked: Vec<(usize, String, usize)> = groups
        .into_values()
        .map(|(rank, spellings)| {
            let total = spellings.iter().map(|(_, n)| n).sum();
            let best = spellings
                .iter()
                .fold(None::<&(String, usize)>, |best, s| match best {
                    Some(b) if b.1 >= s.1 => Some(b),
                    _ => Some(s),
                })
                .map(|(s, _)| s.clone())
                .unwrap_or_default();
            (rank, best, total)
        })
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    ranked.truncate(max_words);

    let max = ranked.first().map_or(1, |r| r.2).max(1) as f64;
    ranked
        .into_iter()
        .map(|(_, word, count)| WordWeight {
            word,
            count,
            weight: count as f64 / max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_cleaned_column() {
        let df = polars::df!(
            "Content" => ["x"],
            "Cleaned Content" => ["y"],
            "Cleaned2" => ["z"],
        )
        .unwrap();
        assert_eq!(cleaned_column(&df).as_deref(), Some("Cleaned Content"));
    }

    #[test]
    fn no_cleaned_column_skips() {
        let df = polars::df!("Content" => ["x"]).unwrap();
        assert_eq!(cleaned_text(&df).unwrap(), None);
    }

    #[test]
    fn joins_non_null_values_with_spaces() {
        let df = polars::df!("CleanedText" => [Some("rust is"), None, Some("fast")]).unwrap();
        assert_eq!(cleaned_text(&df).unwrap().as_deref(), Some("rust is fast"));
    }

    #[test]
    fn standard_stop_words_include_domain_terms() {
        let stop = StopWords::standard();
        for word in ["the", "and", "https", "RT", "tco", "Scott"] {
            assert!(stop.contains(word), "{word} should be a stop word");
        }
        assert!(!stop.contains("dashboard"));
    }

    #[test]
    fn frequencies_merge_case_and_drop_stop_words() {
        let stop = StopWords::from_words(["the", "rt"]);
        let words = word_frequencies(
            "RT the Rust rust Rust crab's crab 2024 a",
            &stop,
            MAX_WORDS,
        );
        let pairs: Vec<(&str, usize)> = words.iter().map(|w| (w.word.as_str(), w.count)).collect();
        assert_eq!(pairs, vec![("Rust", 3), ("crab", 2)]);
        assert_eq!(words[0].weight, 1.0);
        assert!((words[1].weight - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn frequencies_cap_word_count() {
        let text: String = (0..100).map(|i| format!("word{i} ")).collect();
        let words = word_frequencies(&text, &StopWords::from_words(Vec::<String>::new()), MAX_WORDS);
        assert_eq!(words.len(), MAX_WORDS);
        assert_eq!(words[0].word, "word0");
    }
}

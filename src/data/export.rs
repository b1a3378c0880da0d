//! Filtered CSV export and the post-explorer projection it shares.

use crate::data::columns::{self, AUTHOR, CONTENT, DATE, ER, LIKES, NAME, QUOTES, REPLIES, RETWEETS, URL, VIEWS};
use crate::error::{ExportError, PipelineError};
use polars::prelude::*;
use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const EXPORT_FILE_NAME: &str = "social_pulse_filtered.csv";

/// Columns shown in the post explorer and written to the export.
pub const EXPLORER_COLUMNS: [&str; 11] = [
    DATE, AUTHOR, NAME, CONTENT, VIEWS, LIKES, RETWEETS, REPLIES, QUOTES, ER, URL,
];

/// Project to the explorer columns and order newest first, undated rows last.
pub fn explorer_view(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let projected = columns::project(df, &EXPLORER_COLUMNS)?;
    let Some(dates) = columns::date_values(&projected)? else {
        return Ok(projected);
    };
    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by(|&a, &b| match (dates[a], dates[b]) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    Ok(columns::take_rows(&projected, &order)?)
}

/// UTF-8 CSV bytes of the explorer view of `df`.
pub fn export_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut view = explorer_view(df)?;
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut view)?;
    Ok(buf)
}

/// Write the export to `path` and return the number of rows written.
pub fn write_export(df: &DataFrame, path: &Path) -> Result<usize, ExportError> {
    let bytes = export_csv_bytes(df)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    info!(path = %path.display(), rows = df.height(), "exported filtered posts");
    Ok(df.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::{date_values, float_values, int_values, text_values};
    use crate::data::loader::parse_posts;
    use crate::data::processor::derive_metrics;

    const CSV: &str = "\
Date,Author,Content,URL,Likes,Retweets,Replies,Quotes,Views,Extra
2024-02-01 10:00:00,alice,\"Hello, world\",https://x.com/1,3,1,0,0,40,z
not a date,bob,plain,https://x.com/2,0,0,0,0,0,z
2024-02-03 09:30:00,carol,\"say \"\"hi\"\"\",https://x.com/3,5,5,5,5,100,z
";

    fn table() -> DataFrame {
        derive_metrics(&parse_posts(CSV).unwrap()).unwrap()
    }

    #[test]
    fn explorer_is_newest_first_with_undated_last() {
        let view = explorer_view(&table()).unwrap();
        let authors = text_values(&view, AUTHOR).unwrap().unwrap();
        assert_eq!(
            authors,
            vec![
                Some("carol".to_string()),
                Some("alice".to_string()),
                Some("bob".to_string())
            ]
        );
        assert!(!columns::has_column(&view, "Extra"));
        assert!(!columns::has_column(&view, NAME));
    }

    #[test]
    fn export_round_trips() {
        let df = table();
        let bytes = export_csv_bytes(&df).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let back = parse_posts(&text).unwrap();
        let original = explorer_view(&df).unwrap();

        assert_eq!(back.height(), original.height());
        for name in [AUTHOR, CONTENT, URL] {
            assert_eq!(
                text_values(&back, name).unwrap(),
                text_values(&original, name).unwrap()
            );
        }
        for name in [VIEWS, LIKES, RETWEETS, REPLIES, QUOTES] {
            assert_eq!(
                int_values(&back, name).unwrap(),
                int_values(&original, name).unwrap()
            );
        }
        assert_eq!(date_values(&back).unwrap(), date_values(&original).unwrap());

        let er_back = float_values(&back, ER).unwrap().unwrap();
        let er_orig = float_values(&original, ER).unwrap().unwrap();
        for (a, b) in er_back.iter().zip(&er_orig) {
            match (a, b) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9),
                (None, None) => {}
                other => panic!("ER mismatch: {other:?}"),
            }
        }
    }

    #[test]
    fn write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        let rows = write_export(&table(), &path).unwrap();
        assert_eq!(rows, 3);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Author,Content,Views,"));
    }
}

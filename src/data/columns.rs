//! Column names and typed accessors over the post table.
//!
//! Every accessor returns `Ok(None)` when the column is absent so callers can
//! degrade to a no-op instead of failing.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

pub const DATE: &str = "Date";
pub const AUTHOR: &str = "Author";
pub const NAME: &str = "Name";
pub const CONTENT: &str = "Content";
pub const URL: &str = "URL";
pub const LIKES: &str = "Likes";
pub const RETWEETS: &str = "Retweets";
pub const REPLIES: &str = "Replies";
pub const QUOTES: &str = "Quotes";
pub const VIEWS: &str = "Views";
pub const INTERACTIONS: &str = "Interactions";
pub const ENGAGEMENT: &str = "Engagement";
pub const ER: &str = "ER";

/// Raw count columns; each is zero-filled when missing from the source.
pub const SIGNAL_COLUMNS: [&str; 5] = [LIKES, RETWEETS, REPLIES, QUOTES, VIEWS];

/// Marker for the pre-normalized text column used by the word cloud.
pub const CLEANED_MARKER: &str = "Cleaned";

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Integer values of a column with nulls and non-numeric cells read as zero.
pub fn int_values(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<i64>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    let values = casted.i64()?.into_iter().map(|v| v.unwrap_or(0)).collect();
    Ok(Some(values))
}

/// Float values of a column, preserving nulls.
pub fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<Option<f64>>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    Ok(Some(casted.f64()?.into_iter().collect()))
}

/// String values of a column, preserving nulls.
pub fn text_values(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<Option<String>>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let casted = df.column(name)?.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(Some(values))
}

/// Timestamps of the `Date` column. A `Date` column that is not a datetime
/// yields all-null values.
pub fn date_values(df: &DataFrame) -> PolarsResult<Option<Vec<Option<NaiveDateTime>>>> {
    if !has_column(df, DATE) {
        return Ok(None);
    }
    let column = df.column(DATE)?;
    let DataType::Datetime(unit, _) = column.dtype() else {
        return Ok(Some(vec![None; df.height()]));
    };
    let unit = *unit;
    let raw = column.cast(&DataType::Int64)?;
    let values = raw
        .i64()?
        .into_iter()
        .map(|v| v.and_then(|v| from_epoch(v, unit)))
        .collect();
    Ok(Some(values))
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let ts = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
    };
    ts.map(|dt| dt.naive_utc())
}

/// Build a millisecond datetime `Date` column from parsed timestamps.
pub fn date_column(values: &[Option<NaiveDateTime>]) -> PolarsResult<Column> {
    let millis: Vec<Option<i64>> = values
        .iter()
        .map(|v| v.map(|ts| ts.and_utc().timestamp_millis()))
        .collect();
    Column::new(DATE.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Keep the rows whose mask entry is `true`.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    df.filter(&mask)
}

/// Gather rows in the given order.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> PolarsResult<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    df.take(&idx)
}

/// Select the wanted columns that exist, in the wanted order.
pub fn project(df: &DataFrame, wanted: &[&str]) -> PolarsResult<DataFrame> {
    let present: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|name| has_column(df, name))
        .collect();
    df.select(present)
}

/// Render a cell for display, with nulls as an empty string.
pub fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> DataFrame {
        df!(
            "Author" => [Some("a"), None, Some("c")],
            "Views" => [Some(10i64), None, Some(3)],
        )
        .unwrap()
    }

    #[test]
    fn absent_columns_read_as_none() {
        let df = sample();
        assert!(int_values(&df, LIKES).unwrap().is_none());
        assert!(text_values(&df, CONTENT).unwrap().is_none());
        assert!(date_values(&df).unwrap().is_none());
    }

    #[test]
    fn int_values_zero_fill_nulls() {
        let df = sample();
        assert_eq!(int_values(&df, VIEWS).unwrap().unwrap(), vec![10, 0, 3]);
    }

    #[test]
    fn date_column_round_trips_through_accessor() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let mut df = sample();
        df.with_column(date_column(&[Some(ts), None, Some(ts)]).unwrap())
            .unwrap();
        let dates = date_values(&df).unwrap().unwrap();
        assert_eq!(dates, vec![Some(ts), None, Some(ts)]);
    }

    #[test]
    fn project_skips_missing_columns() {
        let df = sample();
        let projected = project(&df, &[DATE, AUTHOR, VIEWS]).unwrap();
        let names: Vec<String> = projected
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Author", "Views"]);
    }

    #[test]
    fn take_rows_reorders() {
        let df = sample();
        let taken = take_rows(&df, &[2, 0]).unwrap();
        assert_eq!(int_values(&taken, VIEWS).unwrap().unwrap(), vec![3, 10]);
    }
}

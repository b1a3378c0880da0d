//! End-to-end checks from CSV text through the loader, the filter chain and
//! the derived displays.

use polars::prelude::DataFrame;
use social_pulse::dashboard::{DashboardPass, DashboardRequest};
use social_pulse::data::columns::{float_values, int_values, text_values, ENGAGEMENT, ER, INTERACTIONS, SIGNAL_COLUMNS, VIEWS};
use social_pulse::data::export::{export_csv_bytes, explorer_view, write_export};
use social_pulse::data::filters::{filter_authors, filter_keyword, filter_min_views};
use social_pulse::data::{fetch_posts, parse_posts, CsvSource, DataLoader, PostFilter};
use social_pulse::error::LoaderError;
use social_pulse::stats::leaderboard::author_leaderboard;
use social_pulse::stats::tokens::{count_tokens, top_tokens};
use social_pulse::stats::{TokenCount, TokenKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SNAPSHOT: &str = "\
Date,Author,Name,Content,Likes,Retweets,Replies,Quotes,Views,URL
2024-02-01 09:00:00,alice,Alice A,Shipping #rust today with @bob,10,2,1,0,400,https://x.com/1
2024-02-01 18:30:00,bob,Bob B,Quiet day,0,0,0,0,0,https://x.com/2
2024-02-03 07:15:00,carol,Carol C,#Rust and #rust again @alice,4,4,2,1,90,https://x.com/3
,alice,Alice A,undated #draft,1,0,0,0,15,https://x.com/4
2024-02-04 12:00:00,dave,Dave D,,3,1,0,0,60,https://x.com/5
";

struct StaticSource {
    body: &'static str,
    calls: AtomicUsize,
}

impl StaticSource {
    fn new(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
        })
    }
}

impl CsvSource for StaticSource {
    fn fetch(&self, _url: &str) -> Result<String, LoaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.to_string())
    }
}

fn table() -> DataFrame {
    let source = StaticSource::new(SNAPSHOT);
    fetch_posts(source.as_ref(), "mem://snapshot").unwrap()
}

#[test]
fn missing_signal_columns_are_zero_and_metrics_derive() {
    let source = StaticSource::new("Author,Content\nalice,hello\nbob,world\n");
    let df = fetch_posts(source.as_ref(), "mem://bare").unwrap();

    for name in SIGNAL_COLUMNS {
        assert_eq!(int_values(&df, name).unwrap().unwrap(), vec![0, 0], "{name}");
    }
    assert_eq!(int_values(&df, INTERACTIONS).unwrap().unwrap(), vec![0, 0]);
    assert_eq!(int_values(&df, ENGAGEMENT).unwrap().unwrap(), vec![0, 0]);
    assert_eq!(float_values(&df, ER).unwrap().unwrap(), vec![None, None]);
}

#[test]
fn er_is_null_exactly_when_views_are_zero() {
    let df = table();
    let views = int_values(&df, VIEWS).unwrap().unwrap();
    let interactions = int_values(&df, INTERACTIONS).unwrap().unwrap();
    let er = float_values(&df, ER).unwrap().unwrap();

    for ((v, i), rate) in views.iter().zip(&interactions).zip(&er) {
        if *v == 0 {
            assert_eq!(*rate, None);
        } else {
            assert_eq!(*rate, Some(*i as f64 / *v as f64));
        }
    }
}

#[test]
fn empty_author_and_keyword_filters_are_identity() {
    let df = table();
    assert!(filter_authors(&df, &[]).unwrap().equals_missing(&df));
    assert!(filter_keyword(&df, "").unwrap().equals_missing(&df));
}

#[test]
fn min_views_filter_is_monotonic() {
    let df = table();
    let mut previous = usize::MAX;
    for threshold in [0, 1, 15, 16, 60, 90, 91, 400, 401] {
        let rows = filter_min_views(&df, Some(threshold)).unwrap().height();
        assert!(rows <= previous, "threshold {threshold} grew the view");
        previous = rows;
    }
    assert_eq!(previous, 0);
}

#[test]
fn hashtags_are_case_sensitive() {
    let counts = count_tokens([Some("Hello #Foo world #foo #Bar")], TokenKind::Hashtag);
    let mut pairs: Vec<(String, usize)> = counts.into_iter().map(|c| (c.token, c.count)).collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("#Bar".to_string(), 1),
            ("#Foo".to_string(), 1),
            ("#foo".to_string(), 1)
        ]
    );
    assert!(count_tokens([None], TokenKind::Hashtag).is_empty());
}

#[test]
fn leaderboard_pins_engagement_formula() {
    let df = parse_posts("Author,Likes,Retweets,Replies,Quotes,Views\nA,1,2,0,0,10\nB,5,0,0,0,0\n").unwrap();
    let df = social_pulse::data::derive_metrics(&df).unwrap();
    assert_eq!(int_values(&df, ENGAGEMENT).unwrap().unwrap(), vec![13, 5]);

    let board = author_leaderboard(&df, 10).unwrap();
    let scores: Vec<(&str, i64)> = board.iter().map(|s| (s.display_name(), s.engagement)).collect();
    assert_eq!(scores, vec![("A", 13), ("B", 5)]);
}

#[test]
fn export_round_trips_retained_columns() {
    let df = table();
    let filtered = PostFilter {
        min_views: Some(1),
        ..PostFilter::default()
    }
    .apply(&df)
    .unwrap();
    let expected = explorer_view(&filtered).unwrap();

    let bytes = export_csv_bytes(&filtered).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let reparsed = parse_posts(&text).unwrap();

    assert_eq!(reparsed.height(), filtered.height());
    for name in ["Author", "Name", "Content", "URL"] {
        assert_eq!(
            text_values(&reparsed, name).unwrap(),
            text_values(&expected, name).unwrap(),
            "{name}"
        );
    }
    for name in SIGNAL_COLUMNS {
        assert_eq!(int_values(&reparsed, name).unwrap(), int_values(&expected, name).unwrap(), "{name}");
    }
    let er_out = float_values(&reparsed, ER).unwrap().unwrap();
    let er_in = float_values(&expected, ER).unwrap().unwrap();
    for (a, b) in er_out.iter().zip(&er_in) {
        match (a, b) {
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9),
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[test]
fn write_export_reports_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let rows = write_export(&table(), &path).unwrap();
    assert_eq!(rows, 5);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("Date,Author,Name,Content,Views"));
}

#[test]
fn loader_refetches_only_after_expiry() {
    let source = StaticSource::new(SNAPSHOT);
    let mut loader = DataLoader::new(source.clone(), Duration::from_secs(3600));
    let start = Instant::now();

    loader.load("mem://snapshot", start).unwrap();
    loader.load("mem://snapshot", start + Duration::from_secs(3599)).unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    loader.load("mem://snapshot", start + Duration::from_secs(3601)).unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn pass_respects_filters_and_drilldown() {
    let df = table();
    let request = DashboardRequest {
        filter: PostFilter {
            min_views: Some(1),
            ..PostFilter::default()
        },
        drill_author: Some("alice".to_string()),
        ..DashboardRequest::default()
    };
    let pass = DashboardPass::compute(&df, &request).unwrap();

    assert_eq!(pass.landing.total_posts, 5);
    assert_eq!(pass.landing.total_views, 565);
    assert_eq!(pass.summary.posts, 4);
    assert_eq!(pass.summary.views, 565);

    assert_eq!(
        top_tokens(&pass.filtered, TokenKind::Hashtag, 15).unwrap(),
        pass.hashtags
    );
    assert_eq!(
        pass.hashtags[0],
        TokenCount {
            token: "#rust".to_string(),
            count: 2
        }
    );

    // alice's only dated post survives the filters.
    assert_eq!(pass.trend.len(), 1);
    assert_eq!(pass.trend[0].views, 400);
    assert_eq!(pass.best_posts.height(), 2);

    let report = serde_json::to_value(pass.report()).unwrap();
    assert_eq!(report["summary"]["posts"], 4);
}

#[test]
fn repeated_passes_are_identical() {
    let df = table();
    let request = DashboardRequest::default();
    let a = DashboardPass::compute(&df, &request).unwrap();
    let b = DashboardPass::compute(&df, &request).unwrap();
    assert!(a.explorer.equals_missing(&b.explorer));
    assert_eq!(a.hashtags, b.hashtags);
    assert_eq!(a.authors, b.authors);
}

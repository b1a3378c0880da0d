//! Static Chart Renderer
//! Draws PNG images with plotters for the word cloud and the daily trend.
//!
//! Word-cloud layout:
//! 1. Words arrive sorted by weight; font size scales with weight
//! 2. Each word walks an Archimedean spiral out from the canvas centre
//! 3. The first collision-free, in-bounds position wins; otherwise the font
//!    shrinks and the walk restarts, down to the minimum size
//! All words are horizontal and placement is deterministic.

use crate::error::RenderError;
use crate::stats::wordcloud::{cleaned_text, word_frequencies, MAX_WORDS};
use crate::stats::{StopWords, TrendPoint, WordWeight};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::io::Cursor;

pub const WORDCLOUD_WIDTH: u32 = 1000;
pub const WORDCLOUD_HEIGHT: u32 = 500;
pub const TREND_WIDTH: u32 = 1200;
pub const TREND_HEIGHT: u32 = 420;

const FONT_FAMILY: &str = "sans-serif";
const MIN_FONT: f64 = 10.0;
const FONT_STEP: f64 = 2.0;
const WORD_PADDING: i32 = 2;
const SPIRAL_STEPS: usize = 6000;

pub const VIEWS_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
pub const INTERACTIONS_COLOR: RGBColor = RGBColor(231, 76, 60); // Red

const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(255, 87, 34),
    RGBColor(121, 85, 72),
    RGBColor(96, 125, 139),
];

/// A word positioned on the canvas (top-left anchored).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub font_size: f64,
    pub color_index: usize,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, w: u32, h: u32) -> bool {
        let pad = WORD_PADDING;
        x < self.x + self.width as i32 + pad
            && self.x < x + w as i32 + pad
            && y < self.y + self.height as i32 + pad
            && self.y < y + h as i32 + pad
    }
}

/// Word cloud of a whole table, or the reason there is none.
#[derive(Debug)]
pub enum WordCloudImage {
    Png { png: Vec<u8>, words: usize },
    NoCleanedColumn,
    NoWords,
}

impl WordCloudImage {
    /// Text shown in place of the image.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Png { .. } => None,
            Self::NoCleanedColumn => Some("No cleaned text column found; word cloud skipped."),
            Self::NoWords => Some("No words left after stop-word removal."),
        }
    }
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Place words without overlap. `measure` returns the pixel box of a word
    /// at a font size, or `None` when it cannot be measured.
    pub fn layout_words<M>(words: &[WordWeight], width: u32, height: u32, mut measure: M) -> Vec<PlacedWord>
    where
        M: FnMut(&str, f64) -> Option<(u32, u32)>,
    {
        let max_font = (height as f64 * 0.25).max(MIN_FONT);
        let mut placed: Vec<PlacedWord> = Vec::new();

        for (i, entry) in words.iter().enumerate() {
            let mut font_size = (max_font * (0.5 * entry.weight + 0.5)).max(MIN_FONT);
            while font_size >= MIN_FONT {
                let Some((w, h)) = measure(&entry.word, font_size) else {
                    break;
                };
                if let Some((x, y)) = Self::find_slot(&placed, width, height, w, h) {
                    placed.push(PlacedWord {
                        word: entry.word.clone(),
                        x,
                        y,
                        width: w,
                        height: h,
                        font_size,
                        color_index: i % PALETTE.len(),
                    });
                    break;
                }
                font_size -= FONT_STEP;
            }
        }
        placed
    }

    fn find_slot(placed: &[PlacedWord], width: u32, height: u32, w: u32, h: u32) -> Option<(i32, i32)> {
        if w > width || h > height {
            return None;
        }
        let cx = (width as f64 - w as f64) / 2.0;
        let cy = (height as f64 - h as f64) / 2.0;
        // Canvas is wider than tall; stretch the spiral horizontally.
        let aspect = width as f64 / height.max(1) as f64;

        for step in 0..SPIRAL_STEPS {
            let theta = step as f64 * 0.1;
            let radius = 1.5 * theta;
            let x = (cx + radius * aspect * theta.cos()).round() as i32;
            let y = (cy + radius * theta.sin()).round() as i32;
            if x < 0 || y < 0 || x + w as i32 > width as i32 || y + h as i32 > height as i32 {
                continue;
            }
            if placed.iter().all(|p| !p.overlaps(x, y, w, h)) {
                return Some((x, y));
            }
        }
        None
    }

    /// Build the word cloud of `table`'s cleaned text column. A missing
    /// column or an empty word list is a placeholder, not an error.
    pub fn wordcloud_for_table(table: &DataFrame) -> Result<WordCloudImage, RenderError> {
        let Some(text) = cleaned_text(table)? else {
            return Ok(WordCloudImage::NoCleanedColumn);
        };
        let words = word_frequencies(&text, &StopWords::standard(), MAX_WORDS);
        if words.is_empty() {
            return Ok(WordCloudImage::NoWords);
        }
        let png = Self::render_wordcloud_png(&words, WORDCLOUD_WIDTH, WORDCLOUD_HEIGHT)?;
        Ok(WordCloudImage::Png {
            png,
            words: words.len(),
        })
    }

    /// Render the weighted words as a PNG.
    pub fn render_wordcloud_png(words: &[WordWeight], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        if words.is_empty() {
            return Err(RenderError::Empty("no words left after stop-word removal"));
        }

        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let placed = Self::layout_words(words, width, height, |word, size| {
                (FONT_FAMILY, size).into_font().box_size(word).ok()
            });
            for p in &placed {
                let color = PALETTE[p.color_index % PALETTE.len()];
                let style = (FONT_FAMILY, p.font_size).into_font().color(&color);
                root.draw_text(&p.word, &style, (p.x, p.y))
                    .map_err(draw_err)?;
            }
            root.present().map_err(draw_err)?;
        }

        Self::encode_png(buf, width, height)
    }

    /// Render the daily Views / Interactions lines as a PNG.
    pub fn render_trend_png(points: &[TrendPoint], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        if points.is_empty() {
            return Err(RenderError::Empty("no dated posts"));
        }

        let max_y = points
            .iter()
            .map(|p| p.views.max(p.interactions))
            .max()
            .unwrap_or(0)
            .max(1);
        let x_end = (points.len().max(2) - 1) as f64;

        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Daily Views & Interactions", (FONT_FAMILY, 22))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(0f64..x_end, 0i64..(max_y + max_y / 10 + 1))
                .map_err(draw_err)?;

            let label_day = |x: &f64| -> String {
                let idx = x.round();
                if idx < 0.0 || (idx - x).abs() > 1e-6 {
                    return String::new();
                }
                points
                    .get(idx as usize)
                    .map(|p| p.day.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            };
            chart
                .configure_mesh()
                .x_labels(points.len().min(10))
                .x_label_formatter(&label_day)
                .y_desc("Count")
                .draw()
                .map_err(draw_err)?;

            for (name, color, interactions) in [
                ("Views", VIEWS_COLOR, false),
                ("Interactions", INTERACTIONS_COLOR, true),
            ] {
                let series: Vec<(f64, i64)> = points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i as f64, if interactions { p.interactions } else { p.views }))
                    .collect();
                chart
                    .draw_series(LineSeries::new(series.clone(), color.stroke_width(2)))
                    .map_err(draw_err)?
                    .label(name)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                chart
                    .draw_series(series.into_iter().map(|pt| Circle::new(pt, 3, color.filled())))
                    .map_err(draw_err)?;
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err)?;
            root.present().map_err(draw_err)?;
        }

        Self::encode_png(buf, width, height)
    }

    fn encode_png(buf: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let img = RgbImage::from_raw(width, height, buf)
            .ok_or(RenderError::Empty("pixel buffer does not match canvas size"))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(n: usize) -> Vec<WordWeight> {
        (0..n)
            .map(|i| WordWeight {
                word: format!("w{i}"),
                count: n - i,
                weight: (n - i) as f64 / n as f64,
            })
            .collect()
    }

    /// Monospace stand-in: 0.6em per char, 1.2em line height.
    fn mono(word: &str, size: f64) -> Option<(u32, u32)> {
        Some((
            (word.len() as f64 * size * 0.6).ceil() as u32,
            (size * 1.2).ceil() as u32,
        ))
    }

    #[test]
    fn placed_words_do_not_overlap_and_stay_in_bounds() {
        let placed = StaticChartRenderer::layout_words(&weights(40), 1000, 500, mono);
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0);
            assert!(a.x + a.width as i32 <= 1000);
            assert!(a.y + a.height as i32 <= 500);
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width, b.height), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn heavier_words_get_larger_fonts() {
        let placed = StaticChartRenderer::layout_words(&weights(3), 1000, 500, mono);
        assert_eq!(placed.len(), 3);
        assert!(placed[0].font_size >= placed[1].font_size);
        assert!(placed[1].font_size >= placed[2].font_size);
    }

    #[test]
    fn layout_is_deterministic() {
        let a = StaticChartRenderer::layout_words(&weights(20), 1000, 500, mono);
        let b = StaticChartRenderer::layout_words(&weights(20), 1000, 500, mono);
        assert_eq!(a, b);
    }

    #[test]
    fn unmeasurable_words_are_skipped() {
        let placed = StaticChartRenderer::layout_words(&weights(5), 1000, 500, |_, _| None);
        assert!(placed.is_empty());
    }

    #[test]
    fn table_without_cleaned_column_gets_placeholder() {
        let table = polars::df!("Content" => ["hello world"]).unwrap();
        let cloud = StaticChartRenderer::wordcloud_for_table(&table).unwrap();
        assert!(matches!(cloud, WordCloudImage::NoCleanedColumn));
        assert!(cloud.placeholder().is_some());
    }

    #[test]
    fn stop_words_only_gets_placeholder() {
        let table = polars::df!("Content Cleaned" => [Some("the and of"), None, Some("https rt 2024")]).unwrap();
        let cloud = StaticChartRenderer::wordcloud_for_table(&table).unwrap();
        assert!(matches!(cloud, WordCloudImage::NoWords));
        assert_eq!(cloud.placeholder(), Some("No words left after stop-word removal."));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            StaticChartRenderer::render_wordcloud_png(&[], 100, 50),
            Err(RenderError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::render_trend_png(&[], 100, 50),
            Err(RenderError::Empty(_))
        ));
    }
}

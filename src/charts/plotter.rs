//! Chart Plotter Module
//! Interactive trend chart, KPI tiles and tables drawn with egui / egui_plot.

use super::renderer;
use crate::data::columns::cell_text;
use crate::stats::{format_count, AuthorScore, TokenCount, TrendPoint};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use plotters::style::RGBColor;
use polars::prelude::DataFrame;

pub const VIEWS_COLOR: Color32 = to_color32(renderer::VIEWS_COLOR);
pub const INTERACTIONS_COLOR: Color32 = to_color32(renderer::INTERACTIONS_COLOR);

const fn to_color32(color: RGBColor) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

/// Header row and stringified cells of a frame, at most `limit` rows.
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl TableData {
    pub fn from_frame(df: &DataFrame, limit: usize) -> Self {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let shown = df.height().min(limit);
        let rows = (0..shown)
            .map(|i| {
                df.get_columns()
                    .iter()
                    .map(|col| col.get(i).map(|v| cell_text(&v)).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            headers,
            rows,
            total_rows: df.height(),
        }
    }
}

/// Draws dashboard widgets.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Daily Views and Interactions as two lines, x-axis labelled by day.
    pub fn draw_trend_chart(ui: &mut egui::Ui, id: &str, points: &[TrendPoint], height: f32) {
        if points.is_empty() {
            ui.label(RichText::new("No dated posts in this view").color(Color32::GRAY));
            return;
        }

        let labels: Vec<String> = points
            .iter()
            .map(|p| p.day.format("%Y-%m-%d").to_string())
            .collect();

        Plot::new(id.to_string())
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Day")
            .y_axis_label("Count")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx < 0.0 || (idx - mark.value).abs() > 1e-6 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (name, color, interactions) in [
                    ("Views", VIEWS_COLOR, false),
                    ("Interactions", INTERACTIONS_COLOR, true),
                ] {
                    let series: Vec<[f64; 2]> = points
                        .iter()
                        .enumerate()
                        .map(|(i, p)| {
                            let y = if interactions { p.interactions } else { p.views };
                            [i as f64, y as f64]
                        })
                        .collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(series.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(series.iter().copied()))
                            .radius(3.0)
                            .color(color),
                    );
                }
            });
    }

    /// A single KPI tile: small caption over a large value.
    pub fn draw_kpi_tile(ui: &mut egui::Ui, label: &str, value: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_min_width(150.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(24.0).strong());
                });
            });
    }

    /// Striped grid with a bold header row.
    pub fn draw_table(ui: &mut egui::Ui, id: &str, table: &TableData) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::both()
                    .id_salt(id)
                    .max_height(360.0)
                    .show(ui, |ui| {
                        egui::Grid::new(ui.make_persistent_id(id))
                            .striped(true)
                            .min_col_width(55.0)
                            .spacing([8.0, 4.0])
                            .show(ui, |ui| {
                                for header in &table.headers {
                                    ui.label(RichText::new(header).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in &table.rows {
                                    for cell in row {
                                        ui.label(RichText::new(truncate(cell, 80)).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });

        if table.total_rows > table.rows.len() {
            ui.label(
                RichText::new(format!(
                    "Showing {} of {} rows",
                    table.rows.len(),
                    format_count(table.total_rows as i64)
                ))
                .size(10.0)
                .color(Color32::GRAY),
            );
        }
    }

    pub fn draw_token_table(ui: &mut egui::Ui, id: &str, label: &str, counts: &[TokenCount]) {
        let table = TableData {
            headers: vec![label.to_string(), "Count".to_string()],
            rows: counts
                .iter()
                .map(|c| vec![c.token.clone(), c.count.to_string()])
                .collect(),
            total_rows: counts.len(),
        };
        Self::draw_table(ui, id, &table);
    }

    pub fn draw_author_table(ui: &mut egui::Ui, id: &str, scores: &[AuthorScore]) {
        let table = TableData {
            headers: vec![
                "Author".to_string(),
                "Engagement".to_string(),
                "Posts".to_string(),
            ],
            rows: scores
                .iter()
                .map(|s| {
                    vec![
                        s.display_name().to_string(),
                        format_count(s.engagement),
                        s.posts.to_string(),
                    ]
                })
                .collect(),
            total_rows: scores.len(),
        };
        Self::draw_table(ui, id, &table);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

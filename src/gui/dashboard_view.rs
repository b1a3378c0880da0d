//! Dashboard View Widget
//! Central area with two pages: the overview of the whole snapshot and the
//! deep dive into the filtered view.

use crate::charts::{
    ChartPlotter, StaticChartRenderer, TableData, WordCloudImage, WORDCLOUD_HEIGHT, WORDCLOUD_WIDTH,
};
use crate::config::BEST_POSTS_RANGE;
use crate::dashboard::{DashboardPass, DEFAULT_BEST_POSTS};
use crate::data::filters::author_options;
use crate::stats::leaderboard::OVERALL;
use crate::stats::{format_count, format_rate, TokenKind};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use polars::prelude::DataFrame;
use tracing::{debug, warn};

const SECTION_SPACING: f32 = 15.0;
const RAW_TABLE_ROWS: usize = 200;
const EXPLORER_ROWS: usize = 500;
const TREND_HEIGHT: f32 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    DeepDive,
}

enum WordCloud {
    Ready(egui::TextureHandle),
    Unavailable(String),
}

/// Page switcher plus the drilldown controls that live next to their charts.
pub struct DashboardView {
    pub page: Page,
    pub drill_author: String,
    pub best_posts: usize,
    wordcloud: Option<WordCloud>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            page: Page::Overview,
            drill_author: OVERALL.to_string(),
            best_posts: DEFAULT_BEST_POSTS,
            wordcloud: None,
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected drilldown author; `None` for the overall view.
    pub fn drill_author(&self) -> Option<String> {
        (self.drill_author != OVERALL).then(|| self.drill_author.clone())
    }

    /// Forget the word cloud so the next frame rebuilds it from a new table.
    pub fn table_changed(&mut self) {
        self.wordcloud = None;
    }

    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, table: Option<&DataFrame>, pass: Option<&DashboardPass>) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.page, Page::Overview, RichText::new("🏠 Overview").size(15.0));
            ui.selectable_value(&mut self.page, Page::DeepDive, RichText::new("🔍 Deep Dive").size(15.0));
        });
        ui.separator();

        let (Some(table), Some(pass)) = (table, pass) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .id_salt("dashboard_page")
            .auto_shrink([false, false])
            .show(ui, |ui| match self.page {
                Page::Overview => self.show_overview(ctx, ui, table, pass),
                Page::DeepDive => self.show_deep_dive(ui, pass),
            });
    }

    fn show_overview(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, table: &DataFrame, pass: &DashboardPass) {
        section_title(ui, "Snapshot");
        ui.horizontal_wrapped(|ui| {
            ChartPlotter::draw_kpi_tile(ui, "Total posts", &format_count(pass.landing.total_posts as i64));
            ChartPlotter::draw_kpi_tile(ui, "Total views", &format_count(pass.landing.total_views));
            ChartPlotter::draw_kpi_tile(ui, "Total likes", &format_count(pass.landing.total_likes));
            ChartPlotter::draw_kpi_tile(ui, "Total retweets", &format_count(pass.landing.total_retweets));
        });
        ui.add_space(SECTION_SPACING);

        section_title(ui, "Word cloud");
        if self.wordcloud.is_none() {
            self.wordcloud = Some(build_wordcloud(ctx, table));
        }
        match &self.wordcloud {
            Some(WordCloud::Ready(texture)) => {
                let width = ui.available_width().min(WORDCLOUD_WIDTH as f32);
                let size = egui::vec2(width, width * WORDCLOUD_HEIGHT as f32 / WORDCLOUD_WIDTH as f32);
                ui.image((texture.id(), size));
            }
            Some(WordCloud::Unavailable(reason)) => {
                ui.label(RichText::new(reason).color(Color32::GRAY));
            }
            None => {}
        }
        ui.add_space(SECTION_SPACING);

        section_title(ui, "Raw data");
        ChartPlotter::draw_table(ui, "raw_table", &TableData::from_frame(table, RAW_TABLE_ROWS));
    }

    fn show_deep_dive(&mut self, ui: &mut egui::Ui, pass: &DashboardPass) {
        section_title(ui, "Filtered view");
        ui.horizontal_wrapped(|ui| {
            ChartPlotter::draw_kpi_tile(ui, "Posts", &format_count(pass.summary.posts as i64));
            ChartPlotter::draw_kpi_tile(ui, "Views", &format_count(pass.summary.views));
            ChartPlotter::draw_kpi_tile(ui, "Interactions", &format_count(pass.summary.interactions));
            ChartPlotter::draw_kpi_tile(ui, "Avg ER", &format_rate(pass.summary.avg_er));
        });
        ui.add_space(SECTION_SPACING);

        ui.columns(3, |cols| {
            section_title(&mut cols[0], "Top hashtags");
            ChartPlotter::draw_token_table(&mut cols[0], "hashtags", TokenKind::Hashtag.label(), &pass.hashtags);
            section_title(&mut cols[1], "Top mentions");
            ChartPlotter::draw_token_table(&mut cols[1], "mentions", TokenKind::Mention.label(), &pass.mentions);
            section_title(&mut cols[2], "Top authors by engagement");
            ChartPlotter::draw_author_table(&mut cols[2], "authors", &pass.authors);
        });
        ui.add_space(SECTION_SPACING);

        section_title(ui, "Daily trend");
        ui.horizontal(|ui| {
            ui.label("Drill into:");
            let options = match author_options(&pass.filtered) {
                Ok(options) => options,
                Err(e) => {
                    warn!(error = %e, "author list unavailable for drilldown");
                    Vec::new()
                }
            };
            if self.drill_author != OVERALL && !options.contains(&self.drill_author) {
                debug!(author = %self.drill_author, "drilldown author filtered out, resetting");
                self.drill_author = OVERALL.to_string();
            }
            ComboBox::from_id_salt("drill_author")
                .width(200.0)
                .selected_text(&self.drill_author)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.drill_author, OVERALL.to_string(), OVERALL);
                    for author in &options {
                        ui.selectable_value(&mut self.drill_author, author.clone(), author);
                    }
                });
        });
        ChartPlotter::draw_trend_chart(ui, "daily_trend", &pass.trend, TREND_HEIGHT);
        ui.add_space(SECTION_SPACING);

        section_title(ui, "Best posts");
        ui.horizontal(|ui| {
            ui.label("Rows:");
            ui.add(egui::Slider::new(&mut self.best_posts, BEST_POSTS_RANGE));
        });
        ChartPlotter::draw_table(ui, "best_posts", &TableData::from_frame(&pass.best_posts, self.best_posts));
        ui.add_space(SECTION_SPACING);

        section_title(ui, "Post explorer");
        ChartPlotter::draw_table(ui, "explorer", &TableData::from_frame(&pass.explorer, EXPLORER_ROWS));
    }
}

fn section_title(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title).size(16.0).strong());
    ui.add_space(5.0);
}

fn build_wordcloud(ctx: &egui::Context, table: &DataFrame) -> WordCloud {
    let (png, words) = match StaticChartRenderer::wordcloud_for_table(table) {
        Ok(WordCloudImage::Png { png, words }) => (png, words),
        Ok(other) => {
            let reason = other.placeholder().unwrap_or_default();
            return WordCloud::Unavailable(reason.to_string());
        }
        Err(e) => {
            warn!(error = %e, "word cloud rendering failed");
            return WordCloud::Unavailable(format!("Word cloud error: {e}"));
        }
    };

    match image::load_from_memory(&png) {
        Ok(image) => {
            let rgba = image.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            debug!(words, "word cloud rendered");
            WordCloud::Ready(ctx.load_texture("wordcloud", color, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            warn!(error = %e, "word cloud decoding failed");
            WordCloud::Unavailable(format!("Word cloud error: {e}"))
        }
    }
}

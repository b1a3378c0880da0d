//! Control Panel Widget
//! Left side panel with the data source, the filter chain and export controls.

use crate::data::filters::{author_options, date_bounds, default_min_views, max_views};
use crate::data::{DateRange, PostFilter};
use crate::error::PipelineError;
use crate::stats::format_count;
use chrono::NaiveDate;
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::DataFrame;
use std::collections::BTreeSet;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter inputs as the user edits them.
#[derive(Default, Clone)]
pub struct FilterSettings {
    pub start_text: String,
    pub end_text: String,
    pub selected_authors: BTreeSet<String>,
    pub min_views: i64,
    pub keyword: String,
}

/// Left side control panel: source, filters, reload and export.
pub struct ControlPanel {
    pub settings: FilterSettings,
    pub source_url: String,
    pub authors: Vec<String>,
    pub date_bounds: Option<DateRange>,
    pub max_views: i64,
    pub last_export: Option<PathBuf>,
    pub status: String,
    seeded: bool,
}

impl ControlPanel {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            settings: FilterSettings::default(),
            source_url: source_url.into(),
            authors: Vec::new(),
            date_bounds: None,
            max_views: 0,
            last_export: None,
            status: "Ready".to_string(),
            seeded: false,
        }
    }

    /// Refresh the control options from a freshly loaded table.
    ///
    /// The first load seeds the date fields with the full range and the
    /// views threshold with the median. Later loads keep what the user set
    /// and drop selected authors that no longer exist.
    pub fn update_options(&mut self, table: &DataFrame) -> Result<(), PipelineError> {
        self.authors = author_options(table)?;
        self.date_bounds = date_bounds(table)?;
        self.max_views = max_views(table)?;

        let known: BTreeSet<&String> = self.authors.iter().collect();
        self.settings.selected_authors.retain(|a| known.contains(a));

        if !self.seeded {
            if let Some(bounds) = self.date_bounds {
                self.settings.start_text = bounds.start.format(DATE_FORMAT).to_string();
                self.settings.end_text = bounds.end.format(DATE_FORMAT).to_string();
            }
            self.settings.min_views = default_min_views(table)?;
            self.seeded = true;
        }
        self.settings.min_views = self.settings.min_views.clamp(0, self.max_views.max(0));
        Ok(())
    }

    /// Current settings as a filter. The date stage is active only when the
    /// table has dates and both fields parse.
    pub fn filter(&self) -> PostFilter {
        let date_range = self
            .date_bounds
            .and(parse_day(&self.settings.start_text))
            .zip(parse_day(&self.settings.end_text))
            .map(|(start, end)| DateRange::new(start, end));

        PostFilter {
            date_range,
            authors: self.settings.selected_authors.iter().cloned().collect(),
            min_views: Some(self.settings.min_views),
            keyword: self.settings.keyword.clone(),
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, is_loading: bool, can_export: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 Social Pulse")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Post engagement dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(shorten_url(&self.source_url))
                        .size(11.0)
                        .color(Color32::GRAY),
                )
                .on_hover_text(&self.source_url);
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!is_loading, |ui| {
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                    if is_loading {
                        ui.spinner();
                    }
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 90.0;

        if let Some(bounds) = self.date_bounds {
            for (label, text) in [
                ("Start date:", &mut self.settings.start_text),
                ("End date:", &mut self.settings.end_text),
            ] {
                ui.horizontal(|ui| {
                    ui.add_sized([label_width, 20.0], egui::Label::new(label));
                    ui.add(
                        egui::TextEdit::singleline(&mut *text)
                            .hint_text("YYYY-MM-DD")
                            .desired_width(110.0),
                    );
                    if parse_day(text.as_str()).is_none() {
                        ui.label(RichText::new("invalid").size(10.0).color(Color32::from_rgb(220, 53, 69)));
                    }
                });
            }
            ui.label(
                RichText::new(format!(
                    "Data spans {} to {}",
                    bounds.start.format(DATE_FORMAT),
                    bounds.end.format(DATE_FORMAT)
                ))
                .size(10.0)
                .color(Color32::GRAY),
            );
            ui.add_space(8.0);
        }

        ui.label("Authors:");
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("author_filter")
                    .max_height(140.0)
                    .show(ui, |ui| {
                        if self.authors.is_empty() {
                            ui.label(RichText::new("No authors").color(Color32::GRAY));
                        }
                        for author in &self.authors {
                            let mut checked = self.settings.selected_authors.contains(author);
                            if ui.checkbox(&mut checked, author).changed() {
                                if checked {
                                    self.settings.selected_authors.insert(author.clone());
                                } else {
                                    self.settings.selected_authors.remove(author);
                                }
                            }
                        }
                    });
            });
        ui.horizontal(|ui| {
            if ui.small_button("Clear All").clicked() {
                self.settings.selected_authors.clear();
            }
            let hint = if self.settings.selected_authors.is_empty() {
                "all authors".to_string()
            } else {
                format!("{} selected", self.settings.selected_authors.len())
            };
            ui.label(RichText::new(hint).size(10.0).color(Color32::GRAY));
        });

        ui.add_space(8.0);
        ui.label("Minimum views:");
        ui.add(egui::Slider::new(&mut self.settings.min_views, 0..=self.max_views.max(0)).logarithmic(true));

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Keyword:"));
            ui.add(egui::TextEdit::singleline(&mut self.settings.keyword).hint_text("search content"));
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(can_export, |ui| {
                let button = egui::Button::new(RichText::new("💾 Export filtered CSV").size(14.0))
                    .min_size(egui::vec2(200.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export;
                }
            });

            if self.last_export.is_some() {
                ui.add_space(5.0);
                if ui.small_button("📂 Open last export").clicked() {
                    action = ControlPanelAction::OpenExport;
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    pub fn set_loaded(&mut self, rows: usize) {
        self.status = format!("Loaded {} posts", format_count(rows as i64));
    }
}

fn parse_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

fn shorten_url(url: &str) -> String {
    let trimmed = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    match trimmed.char_indices().nth(40) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    Export,
    OpenExport,
}

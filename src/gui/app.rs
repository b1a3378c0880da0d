//! Social Pulse Main Application
//! Main window with the control panel and the dashboard pages.

use crate::config::DashboardConfig;
use crate::dashboard::{DashboardPass, DashboardRequest};
use crate::data::export::{write_export, EXPORT_FILE_NAME};
use crate::data::{fetch_posts, CsvSource, DataLoader};
use crate::gui::{ControlPanel, ControlPanelAction, DashboardView};
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Idle repaint interval so an expired snapshot is noticed without input.
const EXPIRY_POLL: Duration = Duration::from_secs(30);

/// Snapshot fetch result from background thread
enum LoadResult {
    Complete(DataFrame),
    Error(String),
}

/// Main application window.
pub struct SocialPulseApp {
    config: DashboardConfig,
    loader: DataLoader,
    control_panel: ControlPanel,
    view: DashboardView,
    table: Option<DataFrame>,

    // Async snapshot loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
    load_failed: bool,
}

impl SocialPulseApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig, source: Arc<dyn CsvSource>) -> Self {
        let loader = DataLoader::new(source, config.cache_ttl());
        Self {
            control_panel: ControlPanel::new(config.csv_url.clone()),
            config,
            loader,
            view: DashboardView::new(),
            table: None,
            load_rx: None,
            is_loading: false,
            load_failed: false,
        }
    }

    /// Fetch the snapshot on a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        self.control_panel.set_status("Fetching snapshot...");
        self.is_loading = true;
        self.load_failed = false;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let source = self.loader.source();
        let url = self.config.csv_url.clone();
        thread::spawn(move || {
            let result = match fetch_posts(source.as_ref(), &url) {
                Ok(df) => LoadResult::Complete(df),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for snapshot loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete(df) => {
                        self.loader.store(&self.config.csv_url, df.clone(), Instant::now());
                        if let Err(e) = self.control_panel.update_options(&df) {
                            warn!(error = %e, "failed to refresh filter options");
                        }
                        self.control_panel.set_loaded(df.height());
                        self.view.table_changed();
                        self.table = Some(df);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(message) => {
                        error!(error = %message, "snapshot load failed");
                        self.control_panel.set_status(&format!("Error: {message}"));
                        self.is_loading = false;
                        self.load_failed = true;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Start a fetch when nothing is loaded yet or the cached snapshot
    /// expired. The stale table stays on screen until the new one arrives.
    /// After a failure only an explicit reload retries.
    fn refresh_if_stale(&mut self) {
        if self.is_loading || self.load_failed {
            return;
        }
        if self.loader.cached(&self.config.csv_url, Instant::now()).is_none() {
            if self.table.is_some() {
                info!(url = %self.config.csv_url, "snapshot expired, refreshing");
            }
            self.start_load();
        }
    }

    fn handle_reload(&mut self) {
        self.loader.invalidate(&self.config.csv_url);
        self.load_failed = false;
        self.start_load();
    }

    fn request(&self) -> DashboardRequest {
        DashboardRequest {
            filter: self.control_panel.filter(),
            drill_author: self.view.drill_author(),
            best_posts: self.view.best_posts,
            top_tokens: self.config.top_tokens,
        }
    }

    /// Save the filtered view as CSV to a user-chosen path.
    fn handle_export(&mut self, filtered: &DataFrame) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return; // User cancelled
        };

        match write_export(filtered, &path) {
            Ok(rows) => {
                self.control_panel
                    .set_status(&format!("Exported {rows} rows to {}", path.display()));
                self.control_panel.last_export = Some(path);
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel.set_status(&format!("Export error: {e}"));
            }
        }
    }

    fn handle_open_export(&mut self) {
        if let Some(path) = self.control_panel.last_export.clone() {
            if let Err(e) = open::that(&path) {
                warn!(error = %e, path = %path.display(), "could not open export");
                self.control_panel.set_status(&format!("Error opening file: {e}"));
            }
        }
    }
}

impl eframe::App for SocialPulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        self.refresh_if_stale();

        if self.is_loading {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(EXPIRY_POLL);
        }

        let pass = self.table.as_ref().and_then(|table| {
            DashboardPass::compute(table, &self.request())
                .map_err(|e| error!(error = %e, "dashboard pass failed"))
                .ok()
        });

        // Left panel - Control Panel
        let mut action = ControlPanelAction::None;
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.control_panel.show(ui, self.is_loading, pass.is_some());
                });
            });

        match action {
            ControlPanelAction::Reload => self.handle_reload(),
            ControlPanelAction::Export => {
                if let Some(pass) = &pass {
                    self.handle_export(&pass.filtered);
                }
            }
            ControlPanelAction::OpenExport => self.handle_open_export(),
            ControlPanelAction::None => {}
        }

        // Central panel - Dashboard pages
        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ctx, ui, self.table.as_ref(), pass.as_ref());
        });
    }
}

//! Podium Main Application
//! Main window with the filter panel and the dashboard pages.

use crate::config::Config;
use crate::data::DataStore;
use crate::filters::FilterOptions;
use crate::gui::{FilterPanel, FilterPanelAction, PageViewer};
use crate::report::{self, ReportOutput};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// Data loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Arc<DataStore>),
    Error(String),
}

/// Report export result from background thread
enum ExportResult {
    Progress(f32, String),
    Complete(ReportOutput),
    Error(String),
}

/// Main application window.
pub struct PodiumApp {
    config: Config,
    store: Option<Arc<DataStore>>,
    filter_panel: FilterPanel,
    page_viewer: PageViewer,

    // Async data loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    // Async report export
    export_rx: Option<Receiver<ExportResult>>,
    is_exporting: bool,
}

impl PodiumApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let filter_panel = FilterPanel::new(config.data.dir.clone(), config.filters.clone());
        let mut app = Self {
            config,
            store: None,
            filter_panel,
            page_viewer: PageViewer::new(),
            load_rx: None,
            is_loading: false,
            export_rx: None,
            is_exporting: false,
        };
        let dir = app.config.data.dir.clone();
        app.start_loading(dir);
        app
    }

    /// Load the CSV folder in a background thread
    fn start_loading(&mut self, dir: PathBuf) {
        if self.is_loading {
            return;
        }

        self.filter_panel.data_dir = Some(dir.clone());
        self.filter_panel.set_progress(0.0, "Loading data...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!("Reading {}...", dir.display())));
            match DataStore::cached(&dir) {
                Ok(store) => {
                    let _ = tx.send(LoadResult::Complete(store));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Handle data folder selection
    fn handle_browse_folder(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            self.start_loading(dir);
        }
    }

    /// Check for data loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.filter_panel.set_progress(0.0, &status);
                    }
                    LoadResult::Complete(store) => {
                        let rows: usize = store.summary().iter().map(|t| t.rows).sum();
                        info!("Loaded {} rows from {}", rows, store.dir().display());
                        self.filter_panel.update_options(FilterOptions::from_store(&store));
                        self.page_viewer.set_store(&store);
                        self.filter_panel.set_progress(
                            0.0,
                            &format!("Loaded {} tables, {} rows", store.summary().len(), rows),
                        );
                        self.store = Some(store);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(e) => {
                        error!("Loading failed: {}", e);
                        self.filter_panel.set_progress(0.0, &format!("Error: {}", e));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Render the report in a background thread
    fn handle_export_report(&mut self) {
        if self.is_exporting {
            return;
        }
        let Some(store) = self.store.clone() else {
            self.filter_panel.set_progress(0.0, "No data loaded");
            return;
        };

        let output_dir = match rfd::FileDialog::new()
            .set_directory(&self.config.report.output_dir)
            .pick_folder()
        {
            Some(dir) => dir,
            None => return,
        };

        let selection = self.filter_panel.selection.clone();
        let settings = self.config.report.settings();
        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.is_exporting = true;
        self.filter_panel.set_progress(10.0, "Rendering charts...");

        thread::spawn(move || {
            let _ = tx.send(ExportResult::Progress(30.0, "Writing report...".to_string()));
            match report::write_report(&store, &selection, &settings, &output_dir) {
                Ok(output) => {
                    let _ = tx.send(ExportResult::Complete(output));
                }
                Err(e) => {
                    let _ = tx.send(ExportResult::Error(format!("{:#}", e)));
                }
            }
        });
    }

    /// Check for export results
    fn check_export_results(&mut self) {
        let rx = self.export_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    ExportResult::Progress(progress, status) => {
                        self.filter_panel.set_progress(progress, &status);
                    }
                    ExportResult::Complete(output) => {
                        self.filter_panel.set_progress(
                            100.0,
                            &format!(
                                "Complete! {} charts written to {}",
                                output.summary.charts.len(),
                                output.index.display()
                            ),
                        );
                        self.is_exporting = false;
                        should_keep_receiver = false;
                    }
                    ExportResult::Error(e) => {
                        error!("Export failed: {}", e);
                        self.filter_panel.set_progress(0.0, &format!("Error: {}", e));
                        self.is_exporting = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.export_rx = Some(rx);
            }
        }
    }
}

impl eframe::App for PodiumApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_export_results();

        if self.is_loading || self.is_exporting {
            ctx.request_repaint();
        }

        // Left panel - Filter Panel
        SidePanel::left("filter_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.filter_panel.show(ui) {
                        FilterPanelAction::BrowseFolder => self.handle_browse_folder(),
                        FilterPanelAction::FiltersChanged => self.page_viewer.invalidate(),
                        FilterPanelAction::ExportReport => self.handle_export_report(),
                        FilterPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard pages
        egui::CentralPanel::default().show(ctx, |ui| {
            self.page_viewer
                .show(ui, self.store.as_deref(), &self.filter_panel.selection);
        });
    }
}

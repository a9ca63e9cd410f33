//! GUI module - User interface components

mod app;
mod filter_panel;
mod pages;

pub use app::PodiumApp;
pub use filter_panel::{FilterPanel, FilterPanelAction};
pub use pages::{Page, PageContent, PageState, PageViewer};

use crate::config::Config;
use eframe::egui;

/// Open the dashboard window and block until it closes.
pub fn run(config: Config) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Podium - Paris 2024"),
        ..Default::default()
    };

    eframe::run_native(
        "Podium",
        options,
        Box::new(|cc| Ok(Box::new(PodiumApp::new(cc, config)))),
    )
}

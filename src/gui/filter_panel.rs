//! Filter Panel Widget
//! Left side panel with the data folder, the four filters and report export.

use crate::data::MedalType;
use crate::filters::{FilterOptions, FilterSelection};
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// Left side panel with data folder selection, filters and export controls.
pub struct FilterPanel {
    pub data_dir: Option<PathBuf>,
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
    search: [String; 3],
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self {
            data_dir: None,
            selection: FilterSelection::default(),
            options: FilterOptions::default(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
            search: Default::default(),
        }
    }
}

impl FilterPanel {
    pub fn new(data_dir: PathBuf, selection: FilterSelection) -> Self {
        Self {
            data_dir: Some(data_dir),
            selection,
            ..Self::default()
        }
    }

    /// Replace the choices after a data load. Selected values that no longer
    /// exist are dropped.
    pub fn update_options(&mut self, options: FilterOptions) {
        self.selection.countries.retain(|c| options.countries.contains(c));
        self.selection.continents.retain(|c| options.continents.contains(c));
        self.selection.sports.retain(|s| options.sports.contains(s));
        self.options = options;
        self.export_enabled = true;
    }

    /// Draw the filter panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> FilterPanelAction {
        let mut action = FilterPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏅 Podium")
                    .size(22.0)
                    .color(Color32::from_rgb(212, 175, 55)),
            );
            ui.label(
                RichText::new("Paris 2024 Olympic Summer Games")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Folder Section =====
        ui.label(RichText::new("📁 Data Folder").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let dir_text = self
                        .data_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "No folder selected".to_string());

                    ui.label(RichText::new(&dir_text).size(12.0).color(
                        if self.data_dir.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = FilterPanelAction::BrowseFolder;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔎 Filters").size(14.0).strong());
        ui.add_space(5.0);

        let mut changed = false;
        changed |= multi_select(
            ui,
            "Countries",
            &self.options.countries,
            &mut self.selection.countries,
            &mut self.search[0],
        );
        changed |= multi_select(
            ui,
            "Continents",
            &self.options.continents,
            &mut self.selection.continents,
            &mut self.search[1],
        );
        changed |= multi_select(
            ui,
            "Sports",
            &self.options.sports,
            &mut self.selection.sports,
            &mut self.search[2],
        );

        ui.add_space(5.0);
        ui.label("Medal Types:");
        ui.horizontal(|ui| {
            for medal in MedalType::ALL {
                let mut on = self.selection.medal_types.contains(&medal);
                if ui.checkbox(&mut on, medal.short()).changed() {
                    if on {
                        self.selection.medal_types.push(medal);
                        self.selection.medal_types.sort();
                    } else {
                        self.selection.medal_types.retain(|m| *m != medal);
                    }
                    changed = true;
                }
            }
        });
        if self.selection.medal_types.is_empty() {
            ui.label(RichText::new("No medal type ticked: showing all").size(11.0).color(Color32::GRAY));
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.small_button("Clear Filters").clicked() && !self.selection.is_empty() {
                self.selection.clear();
                changed = true;
            }
        });
        ui.label(RichText::new(self.selection.summary()).size(11.0).color(Color32::GRAY));

        if changed {
            action = FilterPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Report").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = FilterPanelAction::ExportReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") || self.status.starts_with("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Collapsible checkbox list with a search box. Returns true on change.
fn multi_select(
    ui: &mut egui::Ui,
    label: &str,
    options: &[String],
    selected: &mut Vec<String>,
    search: &mut String,
) -> bool {
    let mut changed = false;
    let header = if selected.is_empty() {
        format!("{}: all", label)
    } else {
        format!("{}: {} selected", label, selected.len())
    };

    egui::CollapsingHeader::new(header)
        .id_salt(label)
        .show(ui, |ui| {
            ui.add(egui::TextEdit::singleline(search).hint_text("Search..."));
            let needle = search.to_lowercase();
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                        for option in options.iter().filter(|o| o.to_lowercase().contains(&needle)) {
                            let mut on = selected.contains(option);
                            if ui.checkbox(&mut on, option).changed() {
                                toggle(selected, option, on);
                                changed = true;
                            }
                        }
                    });
                });
            if !selected.is_empty() && ui.small_button("Clear").clicked() {
                selected.clear();
                changed = true;
            }
        });
    changed
}

fn toggle(selected: &mut Vec<String>, value: &str, on: bool) {
    if on {
        if !selected.iter().any(|s| s == value) {
            selected.push(value.to_string());
        }
    } else {
        selected.retain(|s| s != value);
    }
}

/// Actions triggered by the filter panel
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPanelAction {
    None,
    BrowseFolder,
    FiltersChanged,
    ExportReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut selected = vec!["FRA".to_string()];
        toggle(&mut selected, "USA", true);
        toggle(&mut selected, "USA", true);
        assert_eq!(selected, vec!["FRA", "USA"]);
        toggle(&mut selected, "FRA", false);
        assert_eq!(selected, vec!["USA"]);
    }

    #[test]
    fn test_update_options_drops_stale_choices() {
        let mut panel = FilterPanel::new(
            PathBuf::from("data"),
            FilterSelection {
                countries: vec!["FRA".into(), "XXX".into()],
                sports: vec!["Judo".into()],
                ..FilterSelection::default()
            },
        );
        panel.update_options(FilterOptions {
            countries: vec!["FRA".into(), "USA".into()],
            continents: vec!["Europe".into()],
            sports: vec!["Swimming".into()],
            medal_types: MedalType::ALL.to_vec(),
        });
        assert_eq!(panel.selection.countries, vec!["FRA"]);
        assert!(panel.selection.sports.is_empty());
        assert!(panel.export_enabled);
    }
}

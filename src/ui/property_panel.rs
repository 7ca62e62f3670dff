// src/ui/property_panel.rs

use eframe::egui::{self, Ui};

use crate::scene::{ObjectUiSink, UiContainer};

/// Collects the containers objects publish for the current selection and
/// lays them out as collapsible grids.
#[derive(Default)]
pub struct PropertyPanel {
    containers: Vec<UiContainer>,
}

impl PropertyPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn show(&self, ui: &mut Ui) {
        if self.containers.is_empty() {
            ui.label("Nothing to edit.");
            return;
        }
        for (index, container) in self.containers.iter().enumerate() {
            egui::CollapsingHeader::new(&container.title)
                .id_source(("property_container", index))
                .default_open(true)
                .show(ui, |ui| {
                    egui::Grid::new(("property_grid", index))
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            for (label, value) in &container.rows {
                                ui.label(label);
                                ui.monospace(value);
                                ui.end_row();
                            }
                        });
                });
        }
    }
}

impl ObjectUiSink for PropertyPanel {
    fn clear_containers(&mut self) {
        self.containers.clear();
    }

    fn add_container(&mut self, container: UiContainer) {
        self.containers.push(container);
    }
}

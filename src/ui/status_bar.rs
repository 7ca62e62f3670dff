// src/ui/status_bar.rs

use eframe::egui::{self, Context};

use super::SharedState;

pub struct StatusBar {
    state: SharedState,
}

impl StatusBar {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn update(&mut self, ctx: &Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let state = self.state.read(); // Keep the read lock short.
            let editor = &state.editor;
            let history = editor.history();

            ui.horizontal(|ui| {
                ui.label(&state.status_message);
                ui.separator();
                ui.label(format!("{} selected", editor.selection().len()));
                if editor.current_action().is_active() {
                    ui.separator();
                    ui.label(format!("Dragging: {}", editor.current_action().name()));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if editor.has_unsaved_changes() {
                        ui.label("●");
                    }
                    ui.label(format!("Undo {} / Redo {}", history.undo_len(), history.redo_len()));
                });
            });
        });
    }
}

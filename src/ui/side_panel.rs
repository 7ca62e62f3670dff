// src/ui/side_panel.rs

use eframe::egui::{self, Context, Ui};

use crate::scene::{EditableObject, RedrawFlags};

use super::{PropertyPanel, SharedState};

/// Manages the left-side panel with the outliner and the property panel.
pub struct SidePanel {
    state: SharedState,
    properties: PropertyPanel,
}

impl SidePanel {
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            properties: PropertyPanel::new(),
        }
    }

    /// Asks the editor to refill the property panel for the current selection.
    pub fn refresh_properties(&mut self) {
        self.state
            .read()
            .editor
            .setup_object_ui_control(&mut self.properties);
    }

    pub fn update(&mut self, ctx: &Context) -> RedrawFlags {
        if !self.state.read().show_side_panel {
            return RedrawFlags::empty();
        }

        let mut flags = RedrawFlags::empty();
        egui::SidePanel::left("scene_panel")
            .default_width(250.0)
            .resizable(true)
            .show(ctx, |ui| {
                flags |= self.show_lists(ui);
                ui.separator();
                ui.heading("Properties");
                self.properties.show(ui);
            });
        flags
    }

    /// One collapsible section per list. Clicking an entry selects it; the
    /// list header enters that list.
    fn show_lists(&self, ui: &mut Ui) -> RedrawFlags {
        ui.heading("Outliner");
        let mut state = self.state.write();
        let mut flags = RedrawFlags::empty();
        let mut entered = None;
        let mut clicked = None;

        let current = state.editor.current_list();
        egui::ScrollArea::vertical()
            .max_height(300.0)
            .show(ui, |ui| {
                for (id, list) in state.editor.scene().lists() {
                    let header = if current == Some(id) {
                        format!("▶ {} ({})", list.name(), list.len())
                    } else {
                        format!("{} ({})", list.name(), list.len())
                    };
                    let response = egui::CollapsingHeader::new(header)
                        .id_source(("outliner_list", id.index()))
                        .default_open(current == Some(id))
                        .show(ui, |ui| {
                            for object in list.iter() {
                                let guard = object.read();
                                if ui.selectable_label(guard.is_selected(), guard.name()).clicked() {
                                    clicked = Some((object.clone(), !guard.is_selected()));
                                }
                            }
                        });
                    if response.header_response.double_clicked() {
                        entered = Some(id);
                    }
                }
            });

        if let Some(list) = entered {
            if let Err(err) = state.editor.enter_list(list) {
                state.status_message = format!("Enter list failed: {}", err);
            }
        }
        if let Some((object, select)) = clicked {
            let result = state.editor.toggle_selected(&object, select);
            flags |= state.report(if select { "Select" } else { "Deselect" }, result);
        }
        flags
    }
}

// src/ui/menu.rs

use eframe::egui::{self, Context};
use glam::{Quat, Vec3};

use crate::editor::SceneGenerator;
use crate::scene::{object_ref, EditableObject, Path, PathPoint, RedrawFlags, TransformAction};

use super::{EditorState, SharedState};

pub struct MenuBar {
    state: SharedState,
}

impl MenuBar {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn update(&mut self, ctx: &Context) -> RedrawFlags {
        let mut flags = RedrawFlags::empty();
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Edit", |ui| {
                    if ui.button("Undo").clicked() {
                        let mut state = self.state.write();
                        let result = state.editor.undo();
                        flags |= state.report("Undo", result);
                        ui.close_menu();
                    }
                    if ui.button("Redo").clicked() {
                        let mut state = self.state.write();
                        let result = state.editor.redo();
                        flags |= state.report("Redo", result);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Delete Selected").clicked() {
                        let mut state = self.state.write();
                        let result = state.editor.delete_selected();
                        flags |= state.report("Delete", result);
                        ui.close_menu();
                    }
                    if ui.button("Select None").clicked() {
                        flags |= self.state.write().editor.clear_selection();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Mark Saved").clicked() {
                        self.state.write().editor.mark_saved();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Scene", |ui| {
                    if ui.button("Scatter Props").clicked() {
                        flags |= scatter_props(&mut self.state.write());
                        ui.close_menu();
                    }
                    if ui.button("Add Path").clicked() {
                        flags |= add_path(&mut self.state.write());
                        ui.close_menu();
                    }
                });

                ui.menu_button("Transform", |ui| {
                    if ui.button("Rotate 90°").clicked() {
                        let mut state = self.state.write();
                        let pivot = selection_center(&state);
                        let action = TransformAction::Rotate {
                            pivot,
                            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                        };
                        flags |= apply_action(&mut state, "Rotate", action);
                        ui.close_menu();
                    }
                    if ui.button("Scale x2").clicked() {
                        let mut state = self.state.write();
                        let pivot = selection_center(&state);
                        let action = TransformAction::Scale {
                            pivot,
                            factor: Vec3::splat(2.0),
                        };
                        flags |= apply_action(&mut state, "Scale", action);
                        ui.close_menu();
                    }
                    if ui.button("Grow in Place").clicked() {
                        let action = TransformAction::ScaleExclusive {
                            factor: Vec3::splat(1.5),
                        };
                        flags |= apply_action(&mut self.state.write(), "Grow", action);
                        ui.close_menu();
                    }
                });

                ui.menu_button("Arrange", |ui| {
                    if ui.button("Move Up").clicked() {
                        flags |= move_selected(&mut self.state.write(), -1);
                        ui.close_menu();
                    }
                    if ui.button("Move Down").clicked() {
                        flags |= move_selected(&mut self.state.write(), 1);
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    let mut state = self.state.write();
                    if ui.checkbox(&mut state.show_side_panel, "Side Panel").clicked() {
                        ui.close_menu();
                    }
                });
            });
        });
        flags
    }
}

fn scatter_props(state: &mut EditorState) -> RedrawFlags {
    let Some(list) = state.target_list() else {
        return RedrawFlags::empty();
    };
    let first_index = state.editor.objects().len();
    let props = SceneGenerator::from_settings(state.editor.settings()).generate_props(first_index);
    let result = state.editor.add_default(list, props);
    state.report("Scatter props", result)
}

fn add_path(state: &mut EditorState) -> RedrawFlags {
    let Some(list) = state.target_list() else {
        return RedrawFlags::empty();
    };
    let index = state.editor.objects().len();
    let points = state.editor.create_list(format!("path_{}_points", index));
    let path = object_ref(Path::new(format!("path_{}", index), points));

    let mut flags = RedrawFlags::empty();
    let result = state.editor.add_default(list, vec![path]);
    flags |= state.report("Add path", result);
    let extent = state.editor.settings().generator_extent;
    let corners = [
        Vec3::new(-extent, 0.0, -extent),
        Vec3::new(extent, 0.0, -extent),
        Vec3::new(extent, 0.0, extent),
        Vec3::new(-extent, 0.0, extent),
    ];
    let result = state.editor.add(
        points,
        crate::scene::SelectionBehavior::Keep,
        corners
            .iter()
            .map(|corner| object_ref(PathPoint::new(*corner * 0.5)))
            .collect(),
    );
    flags | state.report("Add path", result)
}

fn selection_center(state: &EditorState) -> Vec3 {
    let positions: Vec<Vec3> = state
        .editor
        .selection()
        .iter()
        .filter_map(|object| object.read().transform())
        .map(|transform| transform.position)
        .collect();
    if positions.is_empty() {
        Vec3::ZERO
    } else {
        positions.iter().copied().sum::<Vec3>() / positions.len() as f32
    }
}

fn apply_action(state: &mut EditorState, what: &str, action: TransformAction) -> RedrawFlags {
    let result = state
        .editor
        .begin_transform(action)
        .and_then(|_| state.editor.apply_current_transform_action());
    state.report(what, result)
}

/// Moves the single selected top-level object one slot within its list.
fn move_selected(state: &mut EditorState, offset: isize) -> RedrawFlags {
    let selected = state.editor.selection().to_vec();
    let [object] = selected.as_slice() else {
        state.status_message = "Select exactly one object to move".to_owned();
        return RedrawFlags::empty();
    };
    let found = state.editor.root_lists().into_iter().find_map(|list| {
        let index = state.editor.scene().list(list).ok()?.index_of(object)?;
        Some((list, index))
    });
    let Some((list, index)) = found else {
        state.status_message = "Only top-level objects can be moved".to_owned();
        return RedrawFlags::empty();
    };
    let result = state.editor.reorder_objects(list, index, 1, offset);
    state.report("Move", result)
}

//! Central panel UI module: a top-down view of the scene (X right, Z down)
//! with zoom, pan, click selection and drag to move.

use eframe::egui::{
    self, Align2, Color32, Context, FontId, Painter, Pos2, Rect, Sense, Stroke, Vec2,
};
use glam::Vec3;

use crate::scene::{EditableObject, ObjectRef, RedrawFlags, TransformAction};

use super::{EditorState, SharedState};

/// Screen distance within which a click hits an object.
const PICK_RADIUS: f32 = 8.0;

pub struct CentralPanel {
    state: SharedState,

    /// Current zoom factor (pixels per world unit).
    zoom: f32,

    /// Current pan offset (in screen coordinates, relative to the panel centre).
    pan: Vec2,

    /// Whether the current drag moves objects rather than the view.
    dragging_objects: bool,
    drag_origin: Option<Vec3>,
}

impl CentralPanel {
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            zoom: 20.0,
            pan: Vec2::ZERO,
            dragging_objects: false,
            drag_origin: None,
        }
    }

    pub fn update(&mut self, ctx: &Context) -> RedrawFlags {
        let mut flags = RedrawFlags::empty();
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.interact(rect, ui.id(), Sense::click_and_drag());
                self.handle_zoom(ui, &response);

                let painter = ui.painter_at(rect);
                self.draw_grid(&painter, rect);
                self.draw_scene(&painter, rect);

                flags |= self.handle_pointer(ui, &response, rect);
                flags |= self.handle_keys(ui);
            });
        flags
    }

    // ============================================================
    // Input
    // ============================================================

    fn handle_zoom(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if response.hovered() && ui.input().scroll_delta.y.abs() > 0.0 {
            let factor = 1.0 + ui.input().scroll_delta.y * 0.001;
            self.zoom = (self.zoom * factor).clamp(1.0, 400.0);
            ui.ctx().request_repaint();
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, rect: Rect) -> RedrawFlags {
        let mut state = self.state.write();
        let mut flags = RedrawFlags::empty();
        let shift = ui.input().modifiers.shift;

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                flags |= self.click(&mut state, rect, pos, shift);
            }
        }

        if response.drag_started() {
            let hit = response
                .interact_pointer_pos()
                .and_then(|pos| self.pick(&state, rect, pos));
            self.dragging_objects = matches!(&hit, Some(object) if state.editor.selection().contains(object));
            if self.dragging_objects {
                self.drag_origin = response
                    .interact_pointer_pos()
                    .map(|pos| self.screen_to_world(rect, pos));
                let result = state.editor.begin_transform(TransformAction::Translate { offset: Vec3::ZERO });
                flags |= state.report("Move", result);
            }
        }

        if response.dragged() {
            if self.dragging_objects {
                if let (Some(origin), Some(pos)) = (self.drag_origin, response.interact_pointer_pos()) {
                    let offset = self.screen_to_world(rect, pos) - origin;
                    let result = state.editor.update_transform(TransformAction::Translate { offset });
                    flags |= state.report("Move", result);
                }
            } else {
                self.pan += response.drag_delta();
                flags |= RedrawFlags::REDRAW;
            }
        }

        if response.drag_released() && self.dragging_objects {
            self.dragging_objects = false;
            self.drag_origin = None;
            let result = state.editor.apply_current_transform_action();
            flags |= state.report("Move", result);
        }
        flags
    }

    fn click(&self, state: &mut EditorState, rect: Rect, pos: Pos2, shift: bool) -> RedrawFlags {
        let hit = self.pick(state, rect, pos);
        let mut flags = RedrawFlags::empty();
        if !shift {
            flags |= state.editor.clear_selection();
        }
        if let Some(object) = hit {
            let select = !(shift && state.editor.selection().contains(&object));
            let result = state.editor.toggle_selected(&object, select);
            flags |= state.report("Select", result);
        }
        flags
    }

    fn handle_keys(&mut self, ui: &egui::Ui) -> RedrawFlags {
        let (delete, undo, redo, escape) = {
            let input = ui.input();
            let command = input.modifiers.command;
            (
                input.key_pressed(egui::Key::Delete),
                command && input.key_pressed(egui::Key::Z),
                command && input.key_pressed(egui::Key::Y),
                input.key_pressed(egui::Key::Escape),
            )
        };

        let mut state = self.state.write();
        if escape && state.editor.current_action().is_active() {
            self.dragging_objects = false;
            self.drag_origin = None;
            return state.editor.cancel_transform();
        }
        if delete {
            let result = state.editor.delete_selected();
            return state.report("Delete", result);
        }
        if undo {
            let result = state.editor.undo();
            return state.report("Undo", result);
        }
        if redo {
            let result = state.editor.redo();
            return state.report("Redo", result);
        }
        RedrawFlags::empty()
    }

    /// The topmost object under `pos`.
    fn pick(&self, state: &EditorState, rect: Rect, pos: Pos2) -> Option<ObjectRef> {
        let scene = state.editor.scene();
        scene
            .lists()
            .flat_map(|(_, list)| list.iter())
            .filter_map(|object| {
                let position = object.read().transform()?.position;
                let distance = self.world_to_screen(rect, position).distance(pos);
                (distance <= PICK_RADIUS).then(|| (distance, object.clone()))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, object)| object)
    }

    // ============================================================
    // Coordinate Conversion
    // ============================================================

    fn world_to_screen(&self, rect: Rect, world: Vec3) -> Pos2 {
        rect.center() + self.pan + Vec2::new(world.x, world.z) * self.zoom
    }

    fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec3 {
        let local = (screen - rect.center() - self.pan) / self.zoom;
        Vec3::new(local.x, 0.0, local.y)
    }

    // ============================================================
    // Drawing
    // ============================================================

    fn draw_grid(&self, painter: &Painter, rect: Rect) {
        let spacing = self.zoom;
        if spacing < 4.0 {
            return;
        }
        let origin = rect.center() + self.pan;
        let stroke = Stroke::new(1.0, Color32::from_gray(30));

        let mut x = origin.x - ((origin.x - rect.left()) / spacing).floor() * spacing;
        while x <= rect.right() {
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            x += spacing;
        }
        let mut y = origin.y - ((origin.y - rect.top()) / spacing).floor() * spacing;
        while y <= rect.bottom() {
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            y += spacing;
        }
    }

    fn draw_scene(&self, painter: &Painter, rect: Rect) {
        let state = self.state.read();
        let editor = &state.editor;
        let roots = editor.root_lists();

        for (id, list) in editor.scene().lists() {
            let nested = !roots.contains(&id);
            let mut previous: Option<Pos2> = None;
            for object in list.iter() {
                let Some(transform) = editor.preview_transform(object) else {
                    continue;
                };
                let guard = object.read();
                let screen = self.world_to_screen(rect, transform.position);
                let color = if guard.is_selected() {
                    Color32::YELLOW
                } else if nested {
                    Color32::LIGHT_BLUE
                } else {
                    Color32::WHITE
                };

                if nested {
                    if let Some(previous) = previous {
                        painter.line_segment([previous, screen], Stroke::new(1.5, Color32::LIGHT_BLUE));
                    }
                    previous = Some(screen);
                    painter.rect_filled(Rect::from_center_size(screen, Vec2::splat(6.0)), 0.0, color);
                } else {
                    let radius = 4.0 * transform.scale.max_element().clamp(0.5, 4.0);
                    painter.circle_filled(screen, radius, color);
                    painter.text(
                        screen + Vec2::new(8.0, -4.0),
                        Align2::LEFT_TOP,
                        guard.name(),
                        FontId::monospace(12.0),
                        color,
                    );
                }
            }
        }
    }
}

//! # Main Window Module
//!
//! Wires the panels into an eframe application:
//! - A top menu bar for editing actions.
//! - A left side panel with the outliner and object properties.
//! - A central top-down view of the scene.
//! - A bottom status bar.

use std::error::Error;

use eframe::egui;
use log::info;

use crate::config::EditorSettings;
use crate::editor::{SceneEditor, SceneGenerator};
use crate::scene::{RedrawFlags, SelectionBehavior};

use super::{CentralPanel, EditorState, MenuBar, SharedState, SidePanel, StatusBar};

pub struct SceneEditorApp {
    state: SharedState,
    menu: MenuBar,
    side_panel: SidePanel,
    central_panel: CentralPanel,
    status_bar: StatusBar,
}

impl SceneEditorApp {
    pub fn new(editor: SceneEditor) -> Self {
        let state = EditorState::shared(editor);
        Self {
            menu: MenuBar::new(state.clone()),
            side_panel: SidePanel::new(state.clone()),
            central_panel: CentralPanel::new(state.clone()),
            status_bar: StatusBar::new(state.clone()),
            state,
        }
    }
}

impl eframe::App for SceneEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut flags = RedrawFlags::empty();
        flags |= self.menu.update(ctx);
        self.status_bar.update(ctx);
        flags |= self.side_panel.update(ctx);
        flags |= self.central_panel.update(ctx);

        if self.state.read().take_scene_changed() || flags.needs_redraw() {
            self.side_panel.refresh_properties();
            ctx.request_repaint();
        }
    }
}

/// Runs the editor as a standalone egui application, starting from a
/// scattered demo scene.
pub fn run_main_window(settings: EditorSettings) -> Result<(), Box<dyn Error>> {
    let (mut editor, objects) = SceneEditor::single_list(settings);
    let props = SceneGenerator::from_settings(editor.settings()).generate_props(0);
    editor.add(objects, SelectionBehavior::Keep, props)?;
    editor.mark_saved();
    info!("Starting editor window with {} object(s)", editor.objects().len());

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "SceneEd",
        native_options,
        Box::new(move |_cc| Box::new(SceneEditorApp::new(editor))),
    );
    // Since run_native returns (), we simply return Ok.
    Ok(())
}

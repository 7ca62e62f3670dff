// src/ui/mod.rs

mod central_panel;
mod main_window;
mod menu;
mod property_panel;
mod side_panel;
mod status_bar;

pub use central_panel::CentralPanel;
pub use main_window::{run_main_window, SceneEditorApp};
pub use menu::MenuBar;
pub use property_panel::PropertyPanel;
pub use side_panel::SidePanel;
pub use status_bar::StatusBar;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::warn;
use parking_lot::RwLock;

use crate::editor::{EditorError, SceneEditor, SceneEvent};
use crate::scene::{ListId, RedrawFlags};

/// Editor plus the bits of UI state every panel needs.
pub struct EditorState {
    pub editor: SceneEditor,
    pub status_message: String,
    pub show_side_panel: bool,
    /// Set by the editor's listener whenever the scene changed.
    scene_changed: Arc<AtomicBool>,
}

pub type SharedState = Arc<RwLock<EditorState>>;

impl EditorState {
    pub fn new(mut editor: SceneEditor) -> Self {
        let scene_changed = Arc::new(AtomicBool::new(true));
        let flag = scene_changed.clone();
        editor.subscribe(move |event: &SceneEvent| {
            if !matches!(event, SceneEvent::DictChanged { .. }) {
                flag.store(true, Ordering::Relaxed);
            }
        });
        Self {
            editor,
            status_message: "Ready".to_owned(),
            show_side_panel: true,
            scene_changed,
        }
    }

    pub fn shared(editor: SceneEditor) -> SharedState {
        Arc::new(RwLock::new(Self::new(editor)))
    }

    /// The list new objects go into.
    pub fn target_list(&self) -> Option<ListId> {
        self.editor
            .current_list()
            .or_else(|| self.editor.root_lists().first().copied())
    }

    /// Puts the outcome of an editor operation in the status bar.
    pub fn report(&mut self, what: &str, result: Result<RedrawFlags, EditorError>) -> RedrawFlags {
        match result {
            Ok(flags) => {
                self.status_message = what.to_owned();
                flags
            }
            Err(err) => {
                warn!("{} failed: {}", what, err);
                self.status_message = format!("{} failed: {}", what, err);
                RedrawFlags::empty()
            }
        }
    }

    /// Whether anything was published since the last call.
    pub fn take_scene_changed(&self) -> bool {
        self.scene_changed.swap(false, Ordering::Relaxed)
    }
}

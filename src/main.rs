#![warn(non_snake_case)]
//! # SceneEd Main Entry Point
//!
//! Loads the editor settings, initializes logging and then either opens the
//! egui editor window or, with the `headless` feature (or without `gui`),
//! runs a scripted editing session against the headless graphics device.
//!
//! ## License
//! Licensed under the MIT License.

use std::error::Error;

use env_logger::{Builder, Env};
use glam::{Quat, Vec3};
use log::info;

use scene_ed::config::{EditorSettings, SETTINGS_FILE};
use scene_ed::editor::{SceneEditor, SceneEvent, SceneGenerator};
use scene_ed::render::{
    BufferHandle, GraphicsDevice, HeadlessDevice, VertexAttribute, VertexLayoutRegistry,
};
use scene_ed::scene::{object_ref, Path, PathPoint, SelectionBehavior, TransformAction};

fn main() -> Result<(), Box<dyn Error>> {
    let settings = EditorSettings::load_optional(SETTINGS_FILE)?.unwrap_or_default();

    // RUST_LOG wins over the configured filter.
    Builder::from_env(Env::default().default_filter_or(settings.log_filter.as_str())).init();
    info!("SceneEd starting...");

    #[cfg(all(feature = "gui", not(feature = "headless")))]
    scene_ed::ui::run_main_window(settings)?;

    #[cfg(any(not(feature = "gui"), feature = "headless"))]
    run_headless(settings)?;

    info!("SceneEd exiting.");
    Ok(())
}

/// Exercises the editor and the vertex registry without a window.
#[cfg_attr(all(feature = "gui", not(feature = "headless")), allow(dead_code))]
fn run_headless(settings: EditorSettings) -> Result<(), Box<dyn Error>> {
    let (mut editor, layers) = SceneEditor::layered(&["background", "foreground"], settings);
    editor.subscribe(|event: &SceneEvent| info!("Event: {:?}", event));

    let generator = SceneGenerator::from_settings(editor.settings());
    let props = generator.generate_props(0);
    editor.add(layers[0], SelectionBehavior::Keep, props.clone())?;
    editor.add_default(layers[1], generator.generate_props(props.len()))?;

    let points = editor.create_list("route_points");
    editor.add(layers[1], SelectionBehavior::Keep, vec![object_ref(Path::new("route", points))])?;
    editor.add(
        points,
        SelectionBehavior::Keep,
        (0..4)
            .map(|i| object_ref(PathPoint::new(Vec3::new(i as f32, 0.0, 0.0))))
            .collect(),
    )?;

    editor.begin_transform(TransformAction::Rotate {
        pivot: Vec3::ZERO,
        rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
    })?;
    editor.apply_current_transform_action()?;
    if let Some(second) = props.get(1) {
        editor.reorder_objects(layers[0], 0, 2, 3)?;
        editor.toggle_selected(second, true)?;
    }
    let flags = editor.delete_selected()?;
    info!(
        "{} top-level object(s) after editing, redraw owed: {:?}",
        editor.objects().len(),
        flags
    );

    while editor.history().can_undo() {
        editor.undo()?;
    }
    info!("{} top-level object(s) after undoing everything", editor.objects().len());

    let mut device = HeadlessDevice::new();
    let first = device.create_context();
    device.create_context();
    let mut registry = VertexLayoutRegistry::new(BufferHandle(1), Some(BufferHandle(2)));
    registry.add_attribute(0, VertexAttribute::floats(3, 24, 0))?;
    registry.add_attribute(1, VertexAttribute::floats(3, 24, 12))?;
    registry.submit(&mut device)?;

    let late = device.create_context();
    device.make_current(late)?;
    registry.use_for(&mut device, late)?;
    device.make_current(first)?;
    registry.use_for(&mut device, first)?;
    info!(
        "Vertex layout realized in {} context(s), {} live vertex array(s)",
        registry.resource_count(),
        device.live_vertex_arrays()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_session_runs() {
        run_headless(EditorSettings::default()).unwrap();
    }
}

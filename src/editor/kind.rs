// src/editor/kind.rs

use super::{DeletionBatcher, EditorError};
use crate::scene::{ListId, ObjectRef, Scene};

/// What distinguishes one kind of scene from another: which objects are
/// top-level, and what "delete selected" sweeps.
pub trait SceneKind {
    /// Lists whose members are the scene's top-level objects.
    fn root_lists(&self) -> Vec<ListId>;

    /// Top-level objects in draw order.
    fn objects(&self, scene: &Scene) -> Vec<ObjectRef>;

    fn delete_selected(
        &self,
        scene: &Scene,
        current: Option<ListId>,
        batcher: &mut DeletionBatcher,
    ) -> Result<(), EditorError>;
}

/// A scene with one flat object list.
#[derive(Debug, Clone)]
pub struct SingleListScene {
    objects: ListId,
}

impl SingleListScene {
    pub fn new(objects: ListId) -> Self {
        Self { objects }
    }
}

impl SceneKind for SingleListScene {
    fn root_lists(&self) -> Vec<ListId> {
        vec![self.objects]
    }

    fn objects(&self, scene: &Scene) -> Vec<ObjectRef> {
        scene
            .list(self.objects)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn delete_selected(
        &self,
        scene: &Scene,
        current: Option<ListId>,
        batcher: &mut DeletionBatcher,
    ) -> Result<(), EditorError> {
        batcher.sweep(scene, self.objects, current)
    }
}

/// A scene split into layers, drawn bottom layer first.
#[derive(Debug, Clone)]
pub struct LayeredScene {
    layers: Vec<ListId>,
}

impl LayeredScene {
    pub fn new(layers: Vec<ListId>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[ListId] {
        &self.layers
    }
}

impl SceneKind for LayeredScene {
    fn root_lists(&self) -> Vec<ListId> {
        self.layers.clone()
    }

    fn objects(&self, scene: &Scene) -> Vec<ObjectRef> {
        self.layers
            .iter()
            .filter_map(|layer| scene.list(*layer).ok())
            .flat_map(|list| list.iter().cloned())
            .collect()
    }

    /// Sweeps every layer into the same batch, so one undo restores them all.
    fn delete_selected(
        &self,
        scene: &Scene,
        current: Option<ListId>,
        batcher: &mut DeletionBatcher,
    ) -> Result<(), EditorError> {
        for layer in &self.layers {
            batcher.sweep(scene, *layer, current)?;
        }
        Ok(())
    }
}

// src/scene/mod.rs

pub mod object;
pub mod props;
pub mod redraw;
pub mod selection;

pub use object::{
    EditableObject, ObjectUiSink, Transform, TransformAction, TransformChange, TransformChanges,
    UiContainer,
};
pub use props::{Path, PathPoint, Prop};
pub use redraw::RedrawFlags;
pub use selection::{SelectionBehavior, SelectionSet};

use crate::editor::EditorError;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to an editable object. The same object may sit in several
/// lists, the selection set and any number of undo records at once.
pub type ObjectRef = Arc<RwLock<dyn EditableObject>>;

/// Wraps a concrete object into a shareable [`ObjectRef`].
pub fn object_ref<T: EditableObject + 'static>(object: T) -> ObjectRef {
    Arc::new(RwLock::new(object))
}

/// Identity of an object, derived from its allocation.
///
/// Two keys are equal exactly when they were taken from clones of the same
/// `ObjectRef`. Keys are only meaningful while some handle keeps the object
/// alive, which undo records guarantee for every object they mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(usize);

impl ObjectKey {
    pub fn of(object: &ObjectRef) -> Self {
        ObjectKey(Arc::as_ptr(object) as *const () as usize)
    }
}

/// Handle to a list owned by a [`Scene`]. Lists are never destroyed, so a
/// handle stays valid for the lifetime of its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(usize);

impl ListId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An ordered sequence of objects. Order is draw order.
#[derive(Default)]
pub struct SceneList {
    name: String,
    objects: Vec<ObjectRef>,
}

impl SceneList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ObjectRef> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.iter()
    }

    pub fn index_of(&self, object: &ObjectRef) -> Option<usize> {
        self.objects.iter().position(|o| Arc::ptr_eq(o, object))
    }

    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.index_of(object).is_some()
    }

    /// Identity keys in list order; handy for comparing list states.
    pub fn keys(&self) -> Vec<ObjectKey> {
        self.objects.iter().map(ObjectKey::of).collect()
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, object: ObjectRef) {
        self.objects.push(object);
    }

    pub(crate) fn insert(&mut self, index: usize, object: ObjectRef) {
        self.objects.insert(index, object);
    }

    pub(crate) fn remove(&mut self, index: usize) -> ObjectRef {
        self.objects.remove(index)
    }
}

impl std::fmt::Debug for SceneList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneList")
            .field("name", &self.name)
            .field("len", &self.objects.len())
            .finish()
    }
}

/// All lists of one editor plus its selection.
///
/// Only the editor and its undo records mutate a scene; everything else
/// reads it through `&Scene`.
#[derive(Default, Debug)]
pub struct Scene {
    lists: Vec<SceneList>,
    selection: SelectionSet,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_list(&mut self, name: impl Into<String>) -> ListId {
        self.lists.push(SceneList::new(name));
        ListId(self.lists.len() - 1)
    }

    pub fn list(&self, id: ListId) -> Result<&SceneList, EditorError> {
        self.lists.get(id.0).ok_or(EditorError::UnknownList(id))
    }

    pub(crate) fn list_mut(&mut self, id: ListId) -> Result<&mut SceneList, EditorError> {
        self.lists.get_mut(id.0).ok_or(EditorError::UnknownList(id))
    }

    pub fn lists(&self) -> impl Iterator<Item = (ListId, &SceneList)> {
        self.lists.iter().enumerate().map(|(i, list)| (ListId(i), list))
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Whether `object` is a member of at least one list of this scene.
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.lists.iter().any(|list| list.contains(object))
    }

    /// Every selected object is reachable from some list.
    pub fn selection_is_reachable(&self) -> bool {
        self.selection.iter().all(|object| self.contains(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_object_key_identity() {
        let a = object_ref(Prop::new("a", Vec3::ZERO));
        let b = object_ref(Prop::new("a", Vec3::ZERO));
        assert_eq!(ObjectKey::of(&a), ObjectKey::of(&a.clone()));
        assert_ne!(ObjectKey::of(&a), ObjectKey::of(&b));
    }

    #[test]
    fn test_list_lookup() {
        let mut scene = Scene::new();
        let id = scene.create_list("objects");
        let a = object_ref(Prop::new("a", Vec3::ZERO));
        let b = object_ref(Prop::new("b", Vec3::ONE));
        {
            let list = scene.list_mut(id).unwrap();
            list.push(a.clone());
            list.push(b.clone());
        }
        let list = scene.list(id).unwrap();
        assert_eq!(list.name(), "objects");
        assert_eq!(list.index_of(&b), Some(1));
        assert!(scene.contains(&a));
        assert_eq!(
            scene.list(ListId(7)).unwrap_err(),
            EditorError::UnknownList(ListId(7))
        );
    }
}

// src/editor/deletion.rs

use super::commands::{DeleteInList, Deletion, SingleDeleteInList, UndoRecord};
use super::EditorError;
use crate::scene::{ListId, ObjectKey, ObjectRef, Scene};
use log::debug;
use std::collections::HashSet;

/// Context handed to each object while "delete selected" sweeps a list.
pub struct DeletionSweep<'a> {
    /// The list being swept; the one the object sits in.
    pub list: ListId,
    /// The list the user has entered, if any.
    pub current: Option<ListId>,
    pub scene: &'a Scene,
}

/// Collects nominated objects per target list, then turns them into one
/// [`Deletion`] record.
///
/// Nominating an object twice into the same list is a no-op. Lists keep the
/// order in which they were first nominated into, and that is also the
/// order they are committed in.
#[derive(Default)]
pub struct DeletionBatcher {
    entries: Vec<(ListId, Vec<ObjectRef>)>,
    nominated: HashSet<(ListId, ObjectKey)>,
}

impl DeletionBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nominates `objects` for removal from `list`. Opens an entry for
    /// `list` even when `objects` is empty; committing such an entry fails.
    pub fn add<I: IntoIterator<Item = ObjectRef>>(&mut self, list: ListId, objects: I) {
        let slot = match self.entries.iter().position(|(id, _)| *id == list) {
            Some(slot) => slot,
            None => {
                self.entries.push((list, Vec::new()));
                self.entries.len() - 1
            }
        };
        for object in objects {
            if self.nominated.insert((list, ObjectKey::of(&object))) {
                self.entries[slot].1.push(object);
            }
        }
    }

    /// Lets every object of `list` nominate itself or related objects.
    pub fn sweep(&mut self, scene: &Scene, list: ListId, current: Option<ListId>) -> Result<(), EditorError> {
        let sweep = DeletionSweep {
            list,
            current,
            scene,
        };
        for object in scene.list(list)?.iter() {
            object.read().delete_selected(object, &sweep, self);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lists with an entry.
    pub fn list_count(&self) -> usize {
        self.entries.len()
    }

    pub fn nominated(&self, list: ListId) -> &[ObjectRef] {
        self.entries
            .iter()
            .find(|(id, _)| *id == list)
            .map(|(_, objects)| objects.as_slice())
            .unwrap_or(&[])
    }

    /// Builds the record: single-object entries use the compact form, the
    /// rest an array. `Ok(None)` when nothing was nominated.
    pub fn into_record(self, scene: &Scene) -> Result<Option<UndoRecord>, EditorError> {
        if self.entries.is_empty() {
            return Ok(None);
        }

        let mut deletion = Deletion::default();
        for (list, objects) in self.entries {
            let mut entry = DeleteInList::capture(scene, list, &objects)?;
            if entry.infos.len() == 1 {
                if let Some(info) = entry.infos.pop() {
                    deletion.singles.push(SingleDeleteInList { list, info });
                }
            } else {
                deletion.lists.push(entry);
            }
        }
        debug!(
            "Batched deletion: {} array entr(ies), {} single entr(ies)",
            deletion.lists.len(),
            deletion.singles.len()
        );
        Ok(Some(UndoRecord::Deletion(deletion)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{object_ref, Prop};
    use glam::Vec3;

    fn prop(name: &str) -> ObjectRef {
        object_ref(Prop::new(name, Vec3::ZERO))
    }

    #[test]
    fn test_duplicate_nominations_are_idempotent() {
        let mut scene = Scene::new();
        let list = scene.create_list("objects");
        let a = prop("a");
        let mut batcher = DeletionBatcher::new();
        batcher.add(list, [a.clone()]);
        batcher.add(list, [a.clone(), a.clone()]);
        assert_eq!(batcher.list_count(), 1);
        assert_eq!(batcher.nominated(list).len(), 1);
    }

    #[test]
    fn test_empty_entry_is_rejected() {
        let mut scene = Scene::new();
        let list = scene.create_list("objects");
        let mut batcher = DeletionBatcher::new();
        batcher.add(list, Vec::new());
        assert_eq!(
            batcher.into_record(&scene).unwrap_err(),
            EditorError::EmptyDeletionEntry(list)
        );
    }

    #[test]
    fn test_single_and_array_entries() {
        let mut scene = Scene::new();
        let first = scene.create_list("first");
        let second = scene.create_list("second");
        let (x, y, z) = (prop("x"), prop("y"), prop("z"));
        scene.list_mut(first).unwrap().push(x.clone());
        for object in [&y, &z] {
            scene.list_mut(second).unwrap().push(object.clone());
        }

        let mut batcher = DeletionBatcher::new();
        batcher.add(first, [x]);
        batcher.add(second, [z, y]);
        let Some(UndoRecord::Deletion(deletion)) = batcher.into_record(&scene).unwrap() else {
            panic!("expected a deletion record");
        };
        assert_eq!(deletion.singles.len(), 1);
        assert_eq!(deletion.singles[0].list, first);
        assert_eq!(deletion.lists.len(), 1);
        assert_eq!(deletion.lists[0].list, second);
        assert_eq!(
            deletion.lists[0].infos.iter().map(|i| i.index).collect::<Vec<_>>(),
            [0, 1]
        );
    }

    #[test]
    fn test_nothing_nominated() {
        let scene = Scene::new();
        assert!(DeletionBatcher::new().into_record(&scene).unwrap().is_none());
    }
}

// src/editor/commands.rs

use super::EditorError;
use crate::scene::{
    ListId, ObjectKey, ObjectRef, RedrawFlags, Scene, SelectionBehavior, TransformChanges,
};
use std::collections::HashSet;
use std::sync::Arc;

/// A reversible record. `execute` performs (or redoes) the change,
/// `unexecute` reverts it. Both check their preconditions before mutating,
/// so an `Err` leaves the scene untouched.
pub trait Command {
    fn execute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError>;
    fn unexecute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError>;
}

/// What an executed record changed, so the editor can notify and signal
/// redraws once per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub redraw: RedrawFlags,
    pub selection_changed: bool,
    pub objects_moved: bool,
    pub lists: Vec<ListId>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self {
            redraw: RedrawFlags::empty(),
            selection_changed: false,
            objects_moved: false,
            lists: Vec::new(),
        }
    }

    /// A structural change of `list`.
    pub fn list(list: ListId) -> Self {
        let mut changes = Self::new();
        changes.redraw = RedrawFlags::structural();
        changes.lists.push(list);
        changes
    }

    pub fn moved() -> Self {
        let mut changes = Self::new();
        changes.redraw = RedrawFlags::structural();
        changes.objects_moved = true;
        changes
    }

    pub fn touch_list(&mut self, list: ListId) {
        if !self.lists.contains(&list) {
            self.lists.push(list);
        }
    }

    pub fn merge(&mut self, other: ChangeSet) {
        self.redraw |= other.redraw;
        self.selection_changed |= other.selection_changed;
        self.objects_moved |= other.objects_moved;
        for list in other.lists {
            self.touch_list(list);
        }
    }
}

impl Default for ChangeSet {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_distinct<'a>(objects: impl IntoIterator<Item = &'a ObjectRef>) -> Result<(), EditorError> {
    let mut seen = HashSet::new();
    for object in objects {
        if !seen.insert(ObjectKey::of(object)) {
            return Err(EditorError::DuplicateObject);
        }
    }
    Ok(())
}

/// Objects appended or inserted into one list.
#[derive(Debug, Clone)]
pub struct Addition {
    pub list: ListId,
    /// Insertion index of the first object; `None` appends.
    pub index: Option<usize>,
    pub objects: Vec<ObjectRef>,
    pub behavior: SelectionBehavior,
    /// Selection before the addition. Undo restores it for `Change` and
    /// only deselects the objects it did not contain for `Add`.
    pub prior_selection: Vec<ObjectRef>,
}

impl Command for Addition {
    fn execute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        if self.objects.is_empty() {
            return Err(EditorError::NoObjects);
        }
        ensure_distinct(&self.objects)?;
        let list = scene.list(self.list)?;
        if self.objects.iter().any(|object| list.contains(object)) {
            return Err(EditorError::ObjectAlreadyInList(self.list));
        }
        let len = list.len();
        let start = match self.index {
            Some(index) if index > len => {
                return Err(EditorError::IndexOutOfRange {
                    list: self.list,
                    index,
                    len,
                })
            }
            Some(index) => index,
            None => len,
        };

        let mut changes = ChangeSet::list(self.list);
        if self.behavior == SelectionBehavior::Change {
            changes.redraw |= scene.selection_mut().clear();
        }

        let list = scene.list_mut(self.list)?;
        for (cursor, object) in (start..).zip(&self.objects) {
            list.insert(cursor, object.clone());
        }

        if self.behavior != SelectionBehavior::Keep {
            let selection = scene.selection_mut();
            for object in &self.objects {
                if let Some(flags) = selection.select(object) {
                    changes.redraw |= flags;
                }
            }
            changes.selection_changed = true;
        }
        Ok(changes)
    }

    fn unexecute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        let list = scene.list(self.list)?;
        let mut indices = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            let index = list
                .index_of(object)
                .ok_or(EditorError::ObjectNotInList(self.list))?;
            indices.push(index);
        }
        indices.sort_unstable();

        let mut changes = ChangeSet::list(self.list);
        let list = scene.list_mut(self.list)?;
        for index in indices.into_iter().rev() {
            list.remove(index);
        }

        let before: HashSet<ObjectKey> = self.prior_selection.iter().map(ObjectKey::of).collect();
        for object in &self.objects {
            let unreachable = !scene.contains(object);
            let newly_selected =
                self.behavior != SelectionBehavior::Keep && !before.contains(&ObjectKey::of(object));
            if scene.selection().contains(object) && (unreachable || newly_selected) {
                changes.redraw |= scene.selection_mut().deselect(object);
                changes.selection_changed = true;
            }
        }

        if self.behavior == SelectionBehavior::Change {
            for object in &self.prior_selection {
                if scene.contains(object) {
                    if let Some(flags) = scene.selection_mut().select(object) {
                        changes.redraw |= flags;
                    }
                }
            }
            changes.selection_changed = true;
        }
        Ok(changes)
    }
}

/// An object as it sat in its list right before removal.
#[derive(Debug, Clone)]
pub struct DeleteInfo {
    pub object: ObjectRef,
    pub index: usize,
    pub was_selected: bool,
}

/// Several objects removed from one list, in ascending index order.
#[derive(Debug, Clone)]
pub struct DeleteInList {
    pub list: ListId,
    pub infos: Vec<DeleteInfo>,
}

impl DeleteInList {
    /// Captures every object's index before anything is removed.
    pub fn capture(scene: &Scene, list: ListId, objects: &[ObjectRef]) -> Result<Self, EditorError> {
        if objects.is_empty() {
            return Err(EditorError::EmptyDeletionEntry(list));
        }
        ensure_distinct(objects)?;
        let members = scene.list(list)?;
        let mut infos = Vec::with_capacity(objects.len());
        for object in objects {
            let index = members
                .index_of(object)
                .ok_or(EditorError::ObjectNotInList(list))?;
            infos.push(DeleteInfo {
                object: object.clone(),
                index,
                was_selected: scene.selection().contains(object),
            });
        }
        infos.sort_by_key(|info| info.index);
        Ok(Self { list, infos })
    }
}

/// The cheap form for a list that loses exactly one object.
#[derive(Debug, Clone)]
pub struct SingleDeleteInList {
    pub list: ListId,
    pub info: DeleteInfo,
}

/// Removals across any number of lists, undone as one step.
#[derive(Debug, Clone, Default)]
pub struct Deletion {
    pub lists: Vec<DeleteInList>,
    pub singles: Vec<SingleDeleteInList>,
}

impl Deletion {
    fn entries(&self) -> impl Iterator<Item = (ListId, &[DeleteInfo])> {
        self.lists
            .iter()
            .map(|entry| (entry.list, entry.infos.as_slice()))
            .chain(
                self.singles
                    .iter()
                    .map(|single| (single.list, std::slice::from_ref(&single.info))),
            )
    }

    pub fn object_count(&self) -> usize {
        self.entries().map(|(_, infos)| infos.len()).sum()
    }
}

impl Command for Deletion {
    fn execute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        for (list_id, infos) in self.entries() {
            let list = scene.list(list_id)?;
            for info in infos {
                match list.get(info.index) {
                    Some(object) if Arc::ptr_eq(object, &info.object) => {}
                    _ => return Err(EditorError::ObjectNotInList(list_id)),
                }
            }
        }

        let mut changes = ChangeSet::new();
        changes.redraw = RedrawFlags::structural();
        changes.selection_changed = true;
        for (list_id, infos) in self.entries() {
            let list = scene.list_mut(list_id)?;
            // Indices were taken before any removal; go back to front.
            for info in infos.iter().rev() {
                list.remove(info.index);
            }
            for info in infos {
                changes.redraw |= scene.selection_mut().deselect(&info.object);
            }
            changes.touch_list(list_id);
        }
        Ok(changes)
    }

    fn unexecute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        for (list_id, infos) in self.entries() {
            let list = scene.list(list_id)?;
            for (inserted, info) in infos.iter().enumerate() {
                if list.contains(&info.object) {
                    return Err(EditorError::ObjectAlreadyInList(list_id));
                }
                if info.index > list.len() + inserted {
                    return Err(EditorError::IndexOutOfRange {
                        list: list_id,
                        index: info.index,
                        len: list.len() + inserted,
                    });
                }
            }
        }

        let mut changes = ChangeSet::new();
        changes.redraw = RedrawFlags::structural();
        for (list_id, infos) in self.entries() {
            let list = scene.list_mut(list_id)?;
            for info in infos {
                list.insert(info.index, info.object.clone());
            }
            for info in infos.iter().filter(|info| info.was_selected) {
                if let Some(flags) = scene.selection_mut().select(&info.object) {
                    changes.redraw |= flags;
                    changes.selection_changed = true;
                }
            }
            changes.touch_list(list_id);
        }
        Ok(changes)
    }
}

/// A contiguous block moved within one list by an exact displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reordering {
    pub list: ListId,
    pub start: usize,
    pub count: usize,
    pub offset: isize,
}

impl Reordering {
    fn move_block(
        scene: &mut Scene,
        list_id: ListId,
        start: usize,
        count: usize,
        offset: isize,
    ) -> Result<ChangeSet, EditorError> {
        let list = scene.list_mut(list_id)?;
        let len = list.len();
        if count == 0 {
            return Err(EditorError::NoObjects);
        }
        if start + count > len {
            return Err(EditorError::RangeOutOfBounds {
                list: list_id,
                start,
                end: start + count,
                len,
            });
        }
        let target = start as isize + offset;
        if target < 0 || target as usize + count > len {
            return Err(EditorError::RangeOutOfBounds {
                list: list_id,
                start: target.max(0) as usize,
                end: target.max(0) as usize + count,
                len,
            });
        }

        let block: Vec<ObjectRef> = (0..count).map(|_| list.remove(start)).collect();
        for (index, object) in (target as usize..).zip(block) {
            list.insert(index, object);
        }
        Ok(ChangeSet::list(list_id))
    }
}

impl Command for Reordering {
    fn execute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        Self::move_block(scene, self.list, self.start, self.count, self.offset)
    }

    fn unexecute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        let moved_to = (self.start as isize + self.offset).max(0) as usize;
        Self::move_block(scene, self.list, moved_to, self.count, -self.offset)
    }
}

impl Command for TransformChanges {
    fn execute(&self, _scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        for change in self.iter() {
            change.object.write().set_transform(change.after);
        }
        Ok(ChangeSet::moved())
    }

    fn unexecute(&self, _scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        for change in self.iter().rev() {
            change.object.write().set_transform(change.before);
        }
        Ok(ChangeSet::moved())
    }
}

/// One entry of the undo history.
#[derive(Debug, Clone)]
pub enum UndoRecord {
    Addition(Addition),
    Deletion(Deletion),
    Reordering(Reordering),
    TransformChange(TransformChanges),
}

impl UndoRecord {
    pub fn describe(&self) -> String {
        match self {
            UndoRecord::Addition(addition) => {
                format!("add {} object(s) to {:?}", addition.objects.len(), addition.list)
            }
            UndoRecord::Deletion(deletion) => format!(
                "delete {} object(s) from {} list(s)",
                deletion.object_count(),
                deletion.lists.len() + deletion.singles.len()
            ),
            UndoRecord::Reordering(reordering) => format!(
                "move {} object(s) of {:?} by {}",
                reordering.count, reordering.list, reordering.offset
            ),
            UndoRecord::TransformChange(changes) => {
                format!("transform {} object(s)", changes.len())
            }
        }
    }
}

impl Command for UndoRecord {
    fn execute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        match self {
            UndoRecord::Addition(addition) => addition.execute(scene),
            UndoRecord::Deletion(deletion) => deletion.execute(scene),
            UndoRecord::Reordering(reordering) => reordering.execute(scene),
            UndoRecord::TransformChange(changes) => changes.execute(scene),
        }
    }

    fn unexecute(&self, scene: &mut Scene) -> Result<ChangeSet, EditorError> {
        match self {
            UndoRecord::Addition(addition) => addition.unexecute(scene),
            UndoRecord::Deletion(deletion) => deletion.unexecute(scene),
            UndoRecord::Reordering(reordering) => reordering.unexecute(scene),
            UndoRecord::TransformChange(changes) => changes.unexecute(scene),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{object_ref, EditableObject, Prop};
    use glam::Vec3;

    fn scene_with(names: &[&str]) -> (Scene, ListId, Vec<ObjectRef>) {
        let mut scene = Scene::new();
        let list = scene.create_list("objects");
        let objects: Vec<ObjectRef> = names
            .iter()
            .map(|name| object_ref(Prop::new(*name, Vec3::ZERO)))
            .collect();
        for object in &objects {
            scene.list_mut(list).unwrap().push(object.clone());
        }
        (scene, list, objects)
    }

    fn names(scene: &Scene, list: ListId) -> Vec<String> {
        scene
            .list(list)
            .unwrap()
            .iter()
            .map(|o| o.read().name().to_string())
            .collect()
    }

    #[test]
    fn test_insert_preserves_relative_order() {
        let (mut scene, list, _) = scene_with(&["a", "b"]);
        let x = object_ref(Prop::new("x", Vec3::ZERO));
        let y = object_ref(Prop::new("y", Vec3::ZERO));
        let record = Addition {
            list,
            index: Some(1),
            objects: vec![x, y],
            behavior: SelectionBehavior::Keep,
            prior_selection: Vec::new(),
        };
        let changes = record.execute(&mut scene).unwrap();
        assert_eq!(names(&scene, list), ["a", "x", "y", "b"]);
        assert!(!changes.selection_changed);
        record.unexecute(&mut scene).unwrap();
        assert_eq!(names(&scene, list), ["a", "b"]);
    }

    #[test]
    fn test_addition_rejects_bad_index_without_mutating() {
        let (mut scene, list, _) = scene_with(&["a"]);
        let record = Addition {
            list,
            index: Some(5),
            objects: vec![object_ref(Prop::new("x", Vec3::ZERO))],
            behavior: SelectionBehavior::Change,
            prior_selection: Vec::new(),
        };
        assert_eq!(
            record.execute(&mut scene).unwrap_err(),
            EditorError::IndexOutOfRange { list, index: 5, len: 1 }
        );
        assert_eq!(names(&scene, list), ["a"]);
    }

    #[test]
    fn test_deletion_restores_indices() {
        let (mut scene, list, objects) = scene_with(&["a", "b", "c", "d", "e"]);
        // Request order differs from list order on purpose.
        let entry =
            DeleteInList::capture(&scene, list, &[objects[3].clone(), objects[1].clone()]).unwrap();
        assert_eq!(
            entry.infos.iter().map(|i| i.index).collect::<Vec<_>>(),
            [1, 3]
        );
        let deletion = Deletion {
            lists: vec![entry],
            singles: Vec::new(),
        };
        deletion.execute(&mut scene).unwrap();
        assert_eq!(names(&scene, list), ["a", "c", "e"]);
        deletion.unexecute(&mut scene).unwrap();
        assert_eq!(names(&scene, list), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_capture_rejects_foreign_and_duplicate_objects() {
        let (scene, list, objects) = scene_with(&["a"]);
        let stranger = object_ref(Prop::new("stranger", Vec3::ZERO));
        assert_eq!(
            DeleteInList::capture(&scene, list, &[stranger]).unwrap_err(),
            EditorError::ObjectNotInList(list)
        );
        assert_eq!(
            DeleteInList::capture(&scene, list, &[objects[0].clone(), objects[0].clone()])
                .unwrap_err(),
            EditorError::DuplicateObject
        );
        assert_eq!(
            DeleteInList::capture(&scene, list, &[]).unwrap_err(),
            EditorError::EmptyDeletionEntry(list)
        );
    }

    #[test]
    fn test_reordering_inverts() {
        let (mut scene, list, _) = scene_with(&["a", "b", "c", "d", "e"]);
        let record = Reordering {
            list,
            start: 3,
            count: 2,
            offset: -2,
        };
        record.execute(&mut scene).unwrap();
        assert_eq!(names(&scene, list), ["a", "d", "e", "b", "c"]);
        record.unexecute(&mut scene).unwrap();
        assert_eq!(names(&scene, list), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_reordering_out_of_range() {
        let (mut scene, list, _) = scene_with(&["a", "b"]);
        let record = Reordering {
            list,
            start: 1,
            count: 2,
            offset: 0,
        };
        assert!(matches!(
            record.execute(&mut scene),
            Err(EditorError::RangeOutOfBounds { .. })
        ));
        assert_eq!(names(&scene, list), ["a", "b"]);
    }

    #[test]
    fn test_change_set_merge() {
        let (_, list, _) = scene_with(&[]);
        let mut a = ChangeSet::list(list);
        let mut b = ChangeSet::moved();
        b.touch_list(list);
        a.merge(b);
        assert!(a.objects_moved);
        assert_eq!(a.lists.len(), 1);
        assert_eq!(a.redraw, RedrawFlags::structural());
    }
}

// src/editor/mod.rs

mod commands;
mod deletion;
mod error;
mod events;
mod generator;
mod history;
mod kind;

pub use commands::{
    Addition, ChangeSet, Command, DeleteInList, DeleteInfo, Deletion, Reordering,
    SingleDeleteInList, UndoRecord,
};
pub use deletion::{DeletionBatcher, DeletionSweep};
pub use error::EditorError;
pub use events::{EventBus, ListenerId, SceneEvent, SceneListener};
pub use generator::SceneGenerator;
pub use history::UndoStack;
pub use kind::{LayeredScene, SceneKind, SingleListScene};

use crate::config::EditorSettings;
use crate::scene::{
    ListId, ObjectRef, ObjectUiSink, RedrawFlags, Scene, SelectionBehavior, SelectionSet,
    Transform, TransformAction, TransformChanges,
};
use log::{debug, error, info};

fn rejected(what: &str, err: EditorError) -> EditorError {
    error!("Rejected {}: {}", what, err);
    err
}

/// The main editor state.
///
/// Owns the scene (lists and selection), the undo history and the listener
/// registry. Every mutation goes through one of its operations, which either
/// commit completely (list change, selection policy, undo record, then
/// notifications) or return an [`EditorError`] having changed nothing.
///
/// Operations return the [`RedrawFlags`] owed to the renderer; the editor
/// never draws anything itself.
pub struct SceneEditor {
    scene: Scene,
    kind: Box<dyn SceneKind>,
    history: UndoStack,
    events: EventBus,
    current_list: Option<ListId>,
    current_action: TransformAction,
    settings: EditorSettings,
}

impl SceneEditor {
    /// Creates an editor over `scene`. The first root list of `kind` becomes
    /// the current list.
    pub fn new(scene: Scene, kind: Box<dyn SceneKind>, settings: EditorSettings) -> Self {
        let current_list = kind.root_lists().first().copied();
        Self {
            scene,
            kind,
            history: UndoStack::new(settings.undo_limit),
            events: EventBus::new(),
            current_list,
            current_action: TransformAction::None,
            settings,
        }
    }

    /// An editor over a fresh scene with a single object list.
    pub fn single_list(settings: EditorSettings) -> (Self, ListId) {
        let mut scene = Scene::new();
        let objects = scene.create_list("objects");
        let editor = Self::new(scene, Box::new(SingleListScene::new(objects)), settings);
        (editor, objects)
    }

    /// An editor over a fresh scene with one list per layer name.
    pub fn layered(names: &[&str], settings: EditorSettings) -> (Self, Vec<ListId>) {
        let mut scene = Scene::new();
        let layers: Vec<ListId> = names.iter().map(|name| scene.create_list(*name)).collect();
        let editor = Self::new(scene, Box::new(LayeredScene::new(layers.clone())), settings);
        (editor, layers)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionSet {
        self.scene.selection()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Creates an extra list, e.g. the point list of a path. Not undoable;
    /// an empty list has no visible effect.
    pub fn create_list(&mut self, name: impl Into<String>) -> ListId {
        self.scene.create_list(name)
    }

    pub fn root_lists(&self) -> Vec<ListId> {
        self.kind.root_lists()
    }

    /// Top-level objects of the scene.
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.kind.objects(&self.scene)
    }

    pub fn subscribe<L: SceneListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    // ----------------- Lists and selection -----------------

    pub fn current_list(&self) -> Option<ListId> {
        self.current_list
    }

    /// Makes `list` the list being edited and announces it.
    pub fn enter_list(&mut self, list: ListId) -> Result<(), EditorError> {
        self.scene
            .list(list)
            .map_err(|err| rejected("enter list", err))?;
        self.current_list = Some(list);
        debug!("Entered list {:?}", list);
        self.events.publish(&SceneEvent::ListEntered { list });
        Ok(())
    }

    /// Selects or deselects one object through its own select/deselect
    /// behavior. Not undoable.
    pub fn toggle_selected(&mut self, object: &ObjectRef, is_selected: bool) -> Result<RedrawFlags, EditorError> {
        let was_member = self.scene.selection().contains(object);
        let mut flags = RedrawFlags::empty();
        if is_selected {
            if !self.scene.contains(object) {
                return Err(rejected("selection", EditorError::ObjectNotInScene));
            }
            if let Some(object_flags) = self.scene.selection_mut().select(object) {
                flags |= object_flags;
            }
        } else {
            flags |= self.scene.selection_mut().deselect(object);
        }

        if was_member != self.scene.selection().contains(object) {
            flags |= RedrawFlags::REDRAW;
            self.events.publish(&SceneEvent::SelectionChanged);
        }
        Ok(flags)
    }

    /// Deselects everything. Not undoable.
    pub fn clear_selection(&mut self) -> RedrawFlags {
        if self.scene.selection().is_empty() {
            return RedrawFlags::empty();
        }
        let flags = self.scene.selection_mut().clear() | RedrawFlags::REDRAW;
        self.events.publish(&SceneEvent::SelectionChanged);
        flags
    }

    // ----------------- Structural mutations -----------------

    /// Appends `objects` to `list` in order and applies `behavior`.
    pub fn add(
        &mut self,
        list: ListId,
        behavior: SelectionBehavior,
        objects: Vec<ObjectRef>,
    ) -> Result<RedrawFlags, EditorError> {
        self.add_in(list, None, behavior, objects)
    }

    /// [`add`](Self::add) with the configured default selection behavior.
    pub fn add_default(&mut self, list: ListId, objects: Vec<ObjectRef>) -> Result<RedrawFlags, EditorError> {
        self.add(list, self.settings.default_selection, objects)
    }

    /// Inserts `objects` into `list` starting at `index`, keeping their order.
    pub fn insert_at(
        &mut self,
        list: ListId,
        index: usize,
        behavior: SelectionBehavior,
        objects: Vec<ObjectRef>,
    ) -> Result<RedrawFlags, EditorError> {
        self.add_in(list, Some(index), behavior, objects)
    }

    pub fn insert_at_default(
        &mut self,
        list: ListId,
        index: usize,
        objects: Vec<ObjectRef>,
    ) -> Result<RedrawFlags, EditorError> {
        self.insert_at(list, index, self.settings.default_selection, objects)
    }

    fn add_in(
        &mut self,
        list: ListId,
        index: Option<usize>,
        behavior: SelectionBehavior,
        objects: Vec<ObjectRef>,
    ) -> Result<RedrawFlags, EditorError> {
        let prior_selection = self.scene.selection().to_vec();
        self.commit(UndoRecord::Addition(Addition {
            list,
            index,
            objects,
            behavior,
            prior_selection,
        }))
    }

    /// Removes `objects` from `list`, deselecting them.
    pub fn delete(&mut self, list: ListId, objects: Vec<ObjectRef>) -> Result<RedrawFlags, EditorError> {
        let entry = DeleteInList::capture(&self.scene, list, &objects)
            .map_err(|err| rejected("delete", err))?;
        self.commit(UndoRecord::Deletion(Deletion {
            lists: vec![entry],
            singles: Vec::new(),
        }))
    }

    /// Deletes whatever the scene kind's sweep nominates, as one undo step.
    pub fn delete_selected(&mut self) -> Result<RedrawFlags, EditorError> {
        let mut batcher = DeletionBatcher::new();
        self.kind
            .delete_selected(&self.scene, self.current_list, &mut batcher)
            .map_err(|err| rejected("delete selected", err))?;
        self.execute_deletion(batcher)
    }

    /// Sweeps only `list` for selected objects and deletes them.
    pub fn delete_selected_in(&mut self, list: ListId) -> Result<RedrawFlags, EditorError> {
        let mut batcher = DeletionBatcher::new();
        batcher
            .sweep(&self.scene, list, self.current_list)
            .map_err(|err| rejected("delete selected", err))?;
        self.execute_deletion(batcher)
    }

    /// Commits a filled batcher. Nothing happens if nothing was nominated.
    pub fn execute_deletion(&mut self, batcher: DeletionBatcher) -> Result<RedrawFlags, EditorError> {
        match batcher
            .into_record(&self.scene)
            .map_err(|err| rejected("deletion batch", err))?
        {
            Some(record) => self.commit(record),
            None => Ok(RedrawFlags::empty()),
        }
    }

    /// Moves `count` objects starting at `original_index` by `offset` slots.
    ///
    /// The block's new start is clamped to the list, so moving past either
    /// end stops there; the undo record stores the displacement that
    /// actually happened.
    pub fn reorder_objects(
        &mut self,
        list: ListId,
        original_index: usize,
        count: usize,
        offset: isize,
    ) -> Result<RedrawFlags, EditorError> {
        let len = self
            .scene
            .list(list)
            .map_err(|err| rejected("reorder", err))?
            .len();
        if count == 0 {
            return Err(rejected("reorder", EditorError::NoObjects));
        }
        if original_index + count > len {
            return Err(rejected(
                "reorder",
                EditorError::RangeOutOfBounds {
                    list,
                    start: original_index,
                    end: original_index + count,
                    len,
                },
            ));
        }
        let last_start = (len - count) as isize;
        let target = (original_index as isize + offset).clamp(0, last_start);
        if target != original_index as isize + offset {
            debug!(
                "Clamped reorder target from {} to {}",
                original_index as isize + offset,
                target
            );
        }
        if target == original_index as isize {
            return Ok(RedrawFlags::empty());
        }
        self.commit(UndoRecord::Reordering(Reordering {
            list,
            start: original_index,
            count,
            offset: target - original_index as isize,
        }))
    }

    // ----------------- Transform actions -----------------

    pub fn current_action(&self) -> &TransformAction {
        &self.current_action
    }

    /// Starts a drag. Only valid while no drag is active.
    pub fn begin_transform(&mut self, action: TransformAction) -> Result<RedrawFlags, EditorError> {
        if self.current_action.is_active() {
            return Err(rejected(
                "drag",
                EditorError::DragInProgress(self.current_action.name()),
            ));
        }
        self.current_action = action;
        Ok(RedrawFlags::REDRAW)
    }

    /// Replaces the parameters of the active drag, e.g. as the mouse moves.
    pub fn update_transform(&mut self, action: TransformAction) -> Result<RedrawFlags, EditorError> {
        if !self.current_action.is_active() {
            return Err(rejected("drag update", EditorError::NoDragInProgress));
        }
        if !self.current_action.same_kind(&action) {
            return Err(rejected(
                "drag update",
                EditorError::DragKindMismatch {
                    active: self.current_action.name(),
                    requested: action.name(),
                },
            ));
        }
        self.current_action = action;
        Ok(RedrawFlags::REDRAW)
    }

    /// Abandons the active drag without touching any object.
    pub fn cancel_transform(&mut self) -> RedrawFlags {
        if std::mem::take(&mut self.current_action).is_active() {
            RedrawFlags::REDRAW
        } else {
            RedrawFlags::empty()
        }
    }

    /// The transform `object` would have if the active drag were committed.
    pub fn preview_transform(&self, object: &ObjectRef) -> Option<Transform> {
        let transform = object.read().transform()?;
        if self.scene.selection().contains(object) {
            Some(self.current_action.apply(&transform))
        } else {
            Some(transform)
        }
    }

    /// Applies the active drag to every selected object, resets the action
    /// and records all before/after pairs as one undo step.
    pub fn apply_current_transform_action(&mut self) -> Result<RedrawFlags, EditorError> {
        let action = std::mem::take(&mut self.current_action);
        if !action.is_active() {
            return Ok(RedrawFlags::empty());
        }

        let mut changes = TransformChanges::new();
        for object in self.scene.selection().to_vec() {
            object
                .write()
                .apply_transform_action(&action, &object, &mut changes);
        }
        if changes.is_empty() {
            debug!("{} drag changed nothing", action.name());
            return Ok(RedrawFlags::REDRAW);
        }

        debug!("Committed {} of {} object(s)", action.name(), changes.len());
        self.history.push(UndoRecord::TransformChange(changes));
        Ok(self.publish(ChangeSet::moved()))
    }

    // ----------------- Collaborator hooks -----------------

    /// Lets each top-level object fill `sink`. When more than one does, the
    /// selection is ambiguous and the sink is left empty.
    pub fn setup_object_ui_control(&self, sink: &mut dyn ObjectUiSink) {
        sink.clear_containers();

        let mut at_least_one = false;
        for object in self.objects() {
            if object.read().try_setup_ui(sink) {
                if at_least_one {
                    sink.clear_containers();
                    return;
                }
                at_least_one = true;
            }
        }
        sink.refresh();
    }

    /// Announces a change to dictionary containers owned by a collaborator.
    pub fn notify_dict_changed(&mut self, dicts: Vec<String>) {
        self.events.publish(&SceneEvent::DictChanged { dicts });
    }

    // ----------------- History -----------------

    /// Reverts the most recent record. Empty flags when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> Result<RedrawFlags, EditorError> {
        let Some(record) = self.history.pop_undo() else {
            debug!("Nothing to undo");
            return Ok(RedrawFlags::empty());
        };
        match record.unexecute(&mut self.scene) {
            Ok(changes) => {
                info!("Undid {}", record.describe());
                self.history.push_undone(record);
                Ok(self.publish(changes))
            }
            Err(err) => {
                error!("Error undoing {}: {}", record.describe(), err);
                self.history.restore_undo(record);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone record.
    pub fn redo(&mut self) -> Result<RedrawFlags, EditorError> {
        let Some(record) = self.history.pop_redo() else {
            debug!("Nothing to redo");
            return Ok(RedrawFlags::empty());
        };
        match record.execute(&mut self.scene) {
            Ok(changes) => {
                info!("Redid {}", record.describe());
                self.history.push_redone(record);
                Ok(self.publish(changes))
            }
            Err(err) => {
                error!("Error redoing {}: {}", record.describe(), err);
                self.history.restore_redo(record);
                Err(err)
            }
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    // ----------------- Internals -----------------

    fn commit(&mut self, record: UndoRecord) -> Result<RedrawFlags, EditorError> {
        let changes = record
            .execute(&mut self.scene)
            .map_err(|err| rejected(&record.describe(), err))?;
        debug!("Committed {}", record.describe());
        self.history.push(record);
        Ok(self.publish(changes))
    }

    /// Notifies list-aware objects and listeners, then hands back the flags.
    fn publish(&mut self, changes: ChangeSet) -> RedrawFlags {
        if !changes.lists.is_empty() {
            let objects = self.objects();
            for list in &changes.lists {
                for object in &objects {
                    object.write().list_changed(*list, &self.scene);
                }
            }
            self.events.publish(&SceneEvent::ListChanged {
                lists: changes.lists,
            });
        }
        if changes.selection_changed {
            self.events.publish(&SceneEvent::SelectionChanged);
        }
        if changes.objects_moved {
            self.events.publish(&SceneEvent::ObjectsMoved);
        }
        changes.redraw
    }
}

impl Default for SceneEditor {
    fn default() -> Self {
        Self::single_list(EditorSettings::default()).0
    }
}

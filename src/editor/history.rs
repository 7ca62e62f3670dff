// src/editor/history.rs

use super::commands::UndoRecord;
use log::debug;

/// Undo and redo stacks of committed records.
#[derive(Debug)]
pub struct UndoStack {
    undo: Vec<UndoRecord>,
    redo: Vec<UndoRecord>,
    /// Oldest records are dropped beyond this many.
    limit: Option<usize>,
    /// Undo depth of the saved state; `None` once no undo or redo leads
    /// back to it.
    saved_at: Option<usize>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(None)
    }
}

impl UndoStack {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit,
            saved_at: Some(0),
        }
    }

    /// Records a freshly committed action. Clears the redo stack.
    pub fn push(&mut self, record: UndoRecord) {
        // A saved state sitting in redo is lost with it.
        if self.saved_at.map_or(false, |depth| depth > self.undo.len()) {
            self.saved_at = None;
        }
        self.undo.push(record);
        self.redo.clear();
        self.trim();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// The record the next undo would revert.
    pub fn peek_undo(&self) -> Option<&UndoRecord> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&UndoRecord> {
        self.redo.last()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.saved_at = Some(0);
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saved_at != Some(self.undo.len())
    }

    pub fn mark_saved(&mut self) {
        self.saved_at = Some(self.undo.len());
    }

    pub(crate) fn pop_undo(&mut self) -> Option<UndoRecord> {
        self.undo.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<UndoRecord> {
        self.redo.pop()
    }

    /// Files a reverted record under redo.
    pub(crate) fn push_undone(&mut self, record: UndoRecord) {
        self.redo.push(record);
    }

    /// Files a redone record back under undo, keeping the rest of redo.
    pub(crate) fn push_redone(&mut self, record: UndoRecord) {
        self.undo.push(record);
        self.trim();
    }

    /// Puts back a record whose undo failed.
    pub(crate) fn restore_undo(&mut self, record: UndoRecord) {
        self.undo.push(record);
    }

    /// Puts back a record whose redo failed.
    pub(crate) fn restore_redo(&mut self, record: UndoRecord) {
        self.redo.push(record);
    }

    fn trim(&mut self) {
        if let Some(limit) = self.limit {
            if self.undo.len() > limit {
                let excess = self.undo.len() - limit;
                self.undo.drain(..excess);
                self.saved_at = self.saved_at.and_then(|depth| depth.checked_sub(excess));
                debug!("Dropped {} record(s) beyond the undo limit", excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::commands::Reordering;
    use crate::scene::Scene;

    fn record(offset: isize) -> UndoRecord {
        let mut scene = Scene::new();
        let list = scene.create_list("objects");
        UndoRecord::Reordering(Reordering {
            list,
            start: 0,
            count: 1,
            offset,
        })
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoStack::new(None);
        stack.push(record(1));
        let undone = stack.pop_undo().unwrap();
        stack.push_undone(undone);
        assert!(stack.can_redo());
        assert!(!stack.has_unsaved_changes());
        stack.push(record(2));
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_len(), 1);
        assert!(stack.has_unsaved_changes());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut stack = UndoStack::new(Some(2));
        for offset in 1..=3 {
            stack.push(record(offset));
        }
        assert_eq!(stack.undo_len(), 2);
        let Some(UndoRecord::Reordering(oldest)) = stack.undo.first() else {
            panic!("expected a reordering");
        };
        assert_eq!(oldest.offset, 2);
    }

    #[test]
    fn test_mark_saved() {
        let mut stack = UndoStack::new(None);
        stack.push(record(1));
        stack.mark_saved();
        assert!(!stack.has_unsaved_changes());
        stack.clear();
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_undo_past_save_is_unsaved() {
        let mut stack = UndoStack::new(None);
        stack.push(record(1));
        stack.push(record(2));
        stack.mark_saved();
        for _ in 0..2 {
            let undone = stack.pop_undo().unwrap();
            stack.push_undone(undone);
            assert!(stack.has_unsaved_changes());
        }
        for _ in 0..2 {
            let redone = stack.pop_redo().unwrap();
            stack.push_redone(redone);
        }
        assert!(!stack.has_unsaved_changes());
    }

    #[test]
    fn test_saved_state_lost_when_redo_is_dropped() {
        let mut stack = UndoStack::new(None);
        stack.push(record(1));
        stack.mark_saved();
        let undone = stack.pop_undo().unwrap();
        stack.push_undone(undone);
        stack.push(record(2));
        assert!(stack.has_unsaved_changes());
        let undone = stack.pop_undo().unwrap();
        stack.push_undone(undone);
        assert!(stack.has_unsaved_changes());
    }

    #[test]
    fn test_saved_depth_follows_limit() {
        let mut stack = UndoStack::new(Some(2));
        stack.push(record(1));
        stack.push(record(2));
        stack.mark_saved();
        stack.push(record(3));
        assert!(stack.has_unsaved_changes());
        let undone = stack.pop_undo().unwrap();
        stack.push_undone(undone);
        assert!(!stack.has_unsaved_changes());
    }
}

// src/scene/selection.rs

use super::{EditableObject, ObjectKey, ObjectRef, RedrawFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How bulk additions treat the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionBehavior {
    /// Select the new objects on top of the existing selection.
    Add,
    /// Deselect everything, then select only the new objects.
    #[default]
    Change,
    /// Leave the selection alone; new objects stay unselected.
    Keep,
}

/// The objects currently selected in one editor, in selection order.
///
/// Membership always goes through the object's own `select_default` /
/// `deselect_all`, so its visual flag never drifts from the set.
#[derive(Default)]
pub struct SelectionSet {
    members: Vec<ObjectRef>,
    keys: HashSet<ObjectKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.keys.contains(&ObjectKey::of(object))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRef> {
        self.members.iter()
    }

    /// Snapshot of the members, for callers that mutate while iterating.
    pub fn to_vec(&self) -> Vec<ObjectRef> {
        self.members.clone()
    }

    pub fn keys(&self) -> &HashSet<ObjectKey> {
        &self.keys
    }

    /// Asks `object` to select itself and records it if it accepts.
    /// Returns `None` when the object refused.
    pub fn select(&mut self, object: &ObjectRef) -> Option<RedrawFlags> {
        let key = ObjectKey::of(object);
        if self.keys.contains(&key) {
            return Some(RedrawFlags::empty());
        }
        let flags = object.write().select_default()?;
        self.keys.insert(key);
        self.members.push(object.clone());
        Some(flags)
    }

    /// Deselects `object` and drops it from the set if it was a member.
    pub fn deselect(&mut self, object: &ObjectRef) -> RedrawFlags {
        let flags = object.write().deselect_all();
        let key = ObjectKey::of(object);
        if self.keys.remove(&key) {
            self.members.retain(|m| ObjectKey::of(m) != key);
        }
        flags
    }

    /// Deselects every member and empties the set.
    pub fn clear(&mut self) -> RedrawFlags {
        let mut flags = RedrawFlags::empty();
        for member in self.members.drain(..) {
            flags |= member.write().deselect_all();
        }
        self.keys.clear();
        flags
    }
}

impl std::fmt::Debug for SelectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|m| m.read().name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{object_ref, Prop};
    use glam::Vec3;

    #[test]
    fn test_select_and_deselect() {
        let mut selection = SelectionSet::new();
        let a = object_ref(Prop::new("a", Vec3::ZERO));
        assert_eq!(selection.select(&a), Some(RedrawFlags::REDRAW));
        assert!(selection.contains(&a));
        assert!(a.read().is_selected());
        // Selecting twice is a no-op.
        assert_eq!(selection.select(&a), Some(RedrawFlags::empty()));
        assert_eq!(selection.len(), 1);

        assert_eq!(selection.deselect(&a), RedrawFlags::REDRAW);
        assert!(selection.is_empty());
        assert!(!a.read().is_selected());
    }

    #[test]
    fn test_locked_object_refuses() {
        let mut selection = SelectionSet::new();
        let locked = object_ref(Prop::new("locked", Vec3::ZERO).locked());
        assert_eq!(selection.select(&locked), None);
        assert!(selection.is_empty());
        assert!(!locked.read().is_selected());
    }

    #[test]
    fn test_clear_deselects_members() {
        let mut selection = SelectionSet::new();
        let a = object_ref(Prop::new("a", Vec3::ZERO));
        let b = object_ref(Prop::new("b", Vec3::ONE));
        selection.select(&a);
        selection.select(&b);
        assert_eq!(selection.clear(), RedrawFlags::REDRAW);
        assert!(selection.is_empty());
        assert!(!a.read().is_selected());
        assert!(!b.read().is_selected());
    }

    #[test]
    fn test_behavior_from_json() {
        let behavior: SelectionBehavior = serde_json::from_str("\"keep\"").unwrap();
        assert_eq!(behavior, SelectionBehavior::Keep);
        assert_eq!(SelectionBehavior::default(), SelectionBehavior::Change);
    }
}

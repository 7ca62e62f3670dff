// src/scene/object.rs

use super::{ListId, ObjectRef, RedrawFlags, Scene};
use crate::editor::{DeletionBatcher, DeletionSweep};
use glam::{Quat, Vec3};
use std::fmt::Debug;

/// Position, orientation and size of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The transform a drag gesture is currently performing on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TransformAction {
    #[default]
    None,
    Translate {
        offset: Vec3,
    },
    /// Orbits positions around `pivot` and turns each object by `rotation`.
    Rotate {
        pivot: Vec3,
        rotation: Quat,
    },
    /// Scales positions away from `pivot` and multiplies each object's size.
    Scale {
        pivot: Vec3,
        factor: Vec3,
    },
    /// Multiplies each object's size, leaving positions alone.
    ScaleExclusive {
        factor: Vec3,
    },
}

impl TransformAction {
    pub fn is_active(&self) -> bool {
        !matches!(self, TransformAction::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransformAction::None => "none",
            TransformAction::Translate { .. } => "translate",
            TransformAction::Rotate { .. } => "rotate",
            TransformAction::Scale { .. } => "scale",
            TransformAction::ScaleExclusive { .. } => "scale-exclusive",
        }
    }

    pub fn same_kind(&self, other: &TransformAction) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn apply(&self, transform: &Transform) -> Transform {
        match *self {
            TransformAction::None => *transform,
            TransformAction::Translate { offset } => Transform {
                position: transform.position + offset,
                ..*transform
            },
            TransformAction::Rotate { pivot, rotation } => Transform {
                position: pivot + rotation * (transform.position - pivot),
                rotation: (rotation * transform.rotation).normalize(),
                ..*transform
            },
            TransformAction::Scale { pivot, factor } => Transform {
                position: pivot + factor * (transform.position - pivot),
                scale: transform.scale * factor,
                ..*transform
            },
            TransformAction::ScaleExclusive { factor } => Transform {
                scale: transform.scale * factor,
                ..*transform
            },
        }
    }
}

/// One object's transform before and after a committed drag.
#[derive(Debug, Clone)]
pub struct TransformChange {
    pub object: ObjectRef,
    pub before: Transform,
    pub after: Transform,
}

/// Changes collected from every selected object during one commit.
#[derive(Debug, Clone, Default)]
pub struct TransformChanges {
    entries: Vec<TransformChange>,
}

impl TransformChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: ObjectRef, before: Transform, after: Transform) {
        self.entries.push(TransformChange {
            object,
            before,
            after,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TransformChange> {
        self.entries.iter()
    }
}

/// A titled group of read-only property rows for the generic object panel.
#[derive(Debug, Clone, PartialEq)]
pub struct UiContainer {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl UiContainer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.rows.push((label.into(), value.to_string()));
        self
    }
}

/// Where objects publish their editable properties.
pub trait ObjectUiSink {
    fn clear_containers(&mut self);
    fn add_container(&mut self, container: UiContainer);
    fn refresh(&mut self) {}
}

/// A scene entity the editor can select, delete, transform and notify.
///
/// Every capability has a default that opts out, so a concrete kind only
/// overrides what it supports:
///
/// * selectable: `is_selected`, `select_default`, `deselect_all`
/// * transformable: `transform`, `set_transform` (and optionally
///   `apply_transform_action`)
/// * deletable: `delete_selected`
/// * list aware: `list_changed`
///
/// The object's own selected flag is only a visual mirror; the editor's
/// [`SelectionSet`](super::SelectionSet) is authoritative and keeps the two
/// in step through `select_default`/`deselect_all`.
pub trait EditableObject: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn is_selected(&self) -> bool {
        false
    }

    /// Marks the object selected. `None` means the object refuses.
    fn select_default(&mut self) -> Option<RedrawFlags> {
        None
    }

    fn deselect_all(&mut self) -> RedrawFlags {
        RedrawFlags::empty()
    }

    fn transform(&self) -> Option<Transform> {
        None
    }

    fn set_transform(&mut self, _transform: Transform) {}

    /// Applies `action` and records the before/after pair into `changes`.
    /// `me` is the handle this object is reached through.
    fn apply_transform_action(
        &mut self,
        action: &TransformAction,
        me: &ObjectRef,
        changes: &mut TransformChanges,
    ) {
        if let Some(before) = self.transform() {
            let after = action.apply(&before);
            if after != before {
                self.set_transform(after);
                changes.push(me.clone(), before, after);
            }
        }
    }

    /// Nominates whatever should go when "delete selected" sweeps the list
    /// this object sits in. May nominate objects of other lists.
    fn delete_selected(
        &self,
        _me: &ObjectRef,
        _sweep: &DeletionSweep<'_>,
        _batcher: &mut DeletionBatcher,
    ) {
    }

    /// Called after a structural change to `list`.
    fn list_changed(&mut self, _list: ListId, _scene: &Scene) {}

    /// Fills `sink` if this object has something to show for the current
    /// selection. Returns whether it did.
    fn try_setup_ui(&self, _sink: &mut dyn ObjectUiSink) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_translate() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let moved = TransformAction::Translate { offset: Vec3::X }.apply(&t);
        assert_eq!(moved.position, Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(moved.scale, Vec3::ONE);
    }

    #[test]
    fn test_rotate_about_pivot() {
        let t = Transform::from_position(Vec3::new(2.0, 0.0, 0.0));
        let action = TransformAction::Rotate {
            pivot: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(FRAC_PI_2),
        };
        let rotated = action.apply(&t);
        assert_approx_eq!(rotated.position.x, 1.0, 1e-5);
        assert_approx_eq!(rotated.position.y, 1.0, 1e-5);
        assert_approx_eq!(rotated.rotation.z, (FRAC_PI_2 / 2.0).sin(), 1e-5);
    }

    #[test]
    fn test_scale_variants() {
        let t = Transform::from_position(Vec3::new(2.0, 0.0, 0.0));
        let scaled = TransformAction::Scale {
            pivot: Vec3::ZERO,
            factor: Vec3::splat(2.0),
        }
        .apply(&t);
        assert_eq!(scaled.position, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(scaled.scale, Vec3::splat(2.0));

        let exclusive = TransformAction::ScaleExclusive {
            factor: Vec3::splat(2.0),
        }
        .apply(&t);
        assert_eq!(exclusive.position, t.position);
        assert_eq!(exclusive.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_action_kinds() {
        let a = TransformAction::Translate { offset: Vec3::X };
        let b = TransformAction::Translate { offset: Vec3::Y };
        assert!(a.same_kind(&b));
        assert!(!a.same_kind(&TransformAction::None));
        assert!(!TransformAction::default().is_active());
        assert_eq!(a.name(), "translate");
    }
}

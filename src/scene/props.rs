// src/scene/props.rs

use super::{
    EditableObject, ListId, ObjectRef, ObjectUiSink, RedrawFlags, Scene, Transform,
    TransformAction, TransformChanges, UiContainer,
};
use crate::editor::{DeletionBatcher, DeletionSweep};
use glam::Vec3;

fn format_vec3(v: Vec3) -> String {
    format!("{:.2}, {:.2}, {:.2}", v.x, v.y, v.z)
}

/// A free-standing object with a full transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub name: String,
    pub transform: Transform,
    locked: bool,
    selected: bool,
}

impl Prop {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            transform: Transform::from_position(position),
            locked: false,
            selected: false,
        }
    }

    /// A locked prop refuses selection.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl EditableObject for Prop {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn select_default(&mut self) -> Option<RedrawFlags> {
        if self.locked {
            return None;
        }
        let was_selected = std::mem::replace(&mut self.selected, true);
        Some(if was_selected {
            RedrawFlags::empty()
        } else {
            RedrawFlags::REDRAW
        })
    }

    fn deselect_all(&mut self) -> RedrawFlags {
        if std::mem::replace(&mut self.selected, false) {
            RedrawFlags::REDRAW
        } else {
            RedrawFlags::empty()
        }
    }

    fn transform(&self) -> Option<Transform> {
        Some(self.transform)
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn delete_selected(&self, me: &ObjectRef, sweep: &DeletionSweep<'_>, batcher: &mut DeletionBatcher) {
        if self.selected {
            batcher.add(sweep.list, [me.clone()]);
        }
    }

    fn try_setup_ui(&self, sink: &mut dyn ObjectUiSink) -> bool {
        if !self.selected {
            return false;
        }
        let (axis, angle) = self.transform.rotation.to_axis_angle();
        sink.add_container(
            UiContainer::new(format!("Prop: {}", self.name))
                .row("Position", format_vec3(self.transform.position))
                .row("Rotation", format!("{:.1}° about {}", angle.to_degrees(), format_vec3(axis)))
                .row("Scale", format_vec3(self.transform.scale)),
        );
        true
    }
}

/// A control point of a [`Path`]. Only its position is editable.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub position: Vec3,
    selected: bool,
}

impl PathPoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            selected: false,
        }
    }
}

impl EditableObject for PathPoint {
    fn name(&self) -> &str {
        "point"
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn select_default(&mut self) -> Option<RedrawFlags> {
        let was_selected = std::mem::replace(&mut self.selected, true);
        Some(if was_selected {
            RedrawFlags::empty()
        } else {
            RedrawFlags::REDRAW
        })
    }

    fn deselect_all(&mut self) -> RedrawFlags {
        if std::mem::replace(&mut self.selected, false) {
            RedrawFlags::REDRAW
        } else {
            RedrawFlags::empty()
        }
    }

    fn transform(&self) -> Option<Transform> {
        Some(Transform::from_position(self.position))
    }

    fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
    }

    // Points have no orientation or size, so only the moved position is kept.
    fn apply_transform_action(
        &mut self,
        action: &TransformAction,
        me: &ObjectRef,
        changes: &mut TransformChanges,
    ) {
        let before = Transform::from_position(self.position);
        let after = Transform::from_position(action.apply(&before).position);
        if after != before {
            self.position = after.position;
            changes.push(me.clone(), before, after);
        }
    }

    fn delete_selected(&self, me: &ObjectRef, sweep: &DeletionSweep<'_>, batcher: &mut DeletionBatcher) {
        if self.selected {
            batcher.add(sweep.list, [me.clone()]);
        }
    }
}

/// A polyline whose points live in their own scene list.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub name: String,
    points: ListId,
    point_count: usize,
    selected: bool,
}

impl Path {
    /// `points` must be a list of the scene this path is added to.
    pub fn new(name: impl Into<String>, points: ListId) -> Self {
        Self {
            name: name.into(),
            points,
            point_count: 0,
            selected: false,
        }
    }

    pub fn points(&self) -> ListId {
        self.points
    }

    /// Point count as of the last change to the point list.
    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

impl EditableObject for Path {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn select_default(&mut self) -> Option<RedrawFlags> {
        let was_selected = std::mem::replace(&mut self.selected, true);
        Some(if was_selected {
            RedrawFlags::empty()
        } else {
            RedrawFlags::REDRAW
        })
    }

    fn deselect_all(&mut self) -> RedrawFlags {
        if std::mem::replace(&mut self.selected, false) {
            RedrawFlags::REDRAW
        } else {
            RedrawFlags::empty()
        }
    }

    /// A selected path goes as a whole, taking all of its points with it.
    /// Otherwise, or while its point list is the entered list, only its
    /// selected points are removed and the path stays.
    fn delete_selected(&self, me: &ObjectRef, sweep: &DeletionSweep<'_>, batcher: &mut DeletionBatcher) {
        let Ok(points) = sweep.scene.list(self.points) else {
            if self.selected {
                batcher.add(sweep.list, [me.clone()]);
            }
            return;
        };
        let editing_points = sweep.current == Some(self.points);
        if self.selected && !editing_points {
            batcher.add(sweep.list, [me.clone()]);
            if !points.is_empty() {
                batcher.add(self.points, points.iter().cloned());
            }
            return;
        }

        let selected: Vec<ObjectRef> = points
            .iter()
            .filter(|point| point.read().is_selected())
            .cloned()
            .collect();
        if !selected.is_empty() {
            batcher.add(self.points, selected);
        }
    }

    fn list_changed(&mut self, list: ListId, scene: &Scene) {
        if list == self.points {
            if let Ok(points) = scene.list(list) {
                self.point_count = points.len();
            }
        }
    }

    fn try_setup_ui(&self, sink: &mut dyn ObjectUiSink) -> bool {
        if !self.selected {
            return false;
        }
        sink.add_container(
            UiContainer::new(format!("Path: {}", self.name)).row("Points", self.point_count),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::object_ref;

    #[test]
    fn test_path_point_ignores_rotation() {
        let point = object_ref(PathPoint::new(Vec3::new(1.0, 0.0, 0.0)));
        let mut changes = TransformChanges::new();
        let action = TransformAction::ScaleExclusive {
            factor: Vec3::splat(3.0),
        };
        point.write().apply_transform_action(&action, &point, &mut changes);
        assert!(changes.is_empty());

        let action = TransformAction::Translate { offset: Vec3::Y };
        point.write().apply_transform_action(&action, &point, &mut changes);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            point.read().transform().unwrap().position,
            Vec3::new(1.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_prop_ui_only_when_selected() {
        struct Collect(Vec<UiContainer>);
        impl ObjectUiSink for Collect {
            fn clear_containers(&mut self) {
                self.0.clear();
            }
            fn add_container(&mut self, container: UiContainer) {
                self.0.push(container);
            }
        }

        let mut prop = Prop::new("crate", Vec3::new(1.0, 2.0, 3.0));
        let mut sink = Collect(Vec::new());
        assert!(!prop.try_setup_ui(&mut sink));
        prop.select_default();
        assert!(prop.try_setup_ui(&mut sink));
        assert_eq!(sink.0[0].title, "Prop: crate");
        assert_eq!(sink.0[0].rows[0], ("Position".to_string(), "1.00, 2.00, 3.00".to_string()));
    }
}

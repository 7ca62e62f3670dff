// src/editor/events.rs

use crate::scene::ListId;
use log::debug;

/// Notifications the editor publishes after an operation.
///
/// Each logical operation publishes at most one of each kind, in the order
/// list-changed, selection-changed, objects-moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    SelectionChanged,
    ObjectsMoved,
    ListChanged { lists: Vec<ListId> },
    /// Raised on behalf of collaborators that keep dictionary containers.
    DictChanged { dicts: Vec<String> },
    ListEntered { list: ListId },
}

pub trait SceneListener {
    fn on_scene_event(&mut self, event: &SceneEvent);
}

impl<F: FnMut(&SceneEvent)> SceneListener for F {
    fn on_scene_event(&mut self, event: &SceneEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registered listeners, called synchronously in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn SceneListener>)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<L: SceneListener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn publish(&mut self, event: &SceneEvent) {
        debug!("Publishing {:?} to {} listener(s)", event, self.listeners.len());
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_scene_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let first = log.clone();
        bus.subscribe(move |event: &SceneEvent| first.borrow_mut().push(("first", event.clone())));
        let second = log.clone();
        bus.subscribe(move |event: &SceneEvent| second.borrow_mut().push(("second", event.clone())));

        bus.publish(&SceneEvent::SelectionChanged);
        assert_eq!(
            *log.borrow(),
            vec![
                ("first", SceneEvent::SelectionChanged),
                ("second", SceneEvent::SelectionChanged)
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = count.clone();
        let id = bus.subscribe(move |_: &SceneEvent| *counter.borrow_mut() += 1);
        bus.publish(&SceneEvent::ObjectsMoved);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&SceneEvent::ObjectsMoved);
        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}

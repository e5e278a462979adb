//! Events collected by a widget during one frame.
//!
//! Widgets never touch the model. They push events here and the app
//! forwards the queue to the bus after the panel is drawn.

use crate::core::event_bus::{BoxedEvent, Event, EventBus};

#[derive(Default)]
pub struct ActionQueue {
    pub events: Vec<BoxedEvent>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send<E: Event>(&mut self, event: E) {
        self.events.push(Box::new(event));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Move every queued event onto the bus, in order.
    pub fn forward(self, bus: &EventBus) {
        for event in self.events {
            bus.emit_boxed(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::downcast_event;
    use crate::entities::Point;
    use crate::entities::inspector_events::PickEvent;

    #[test]
    fn forward_keeps_order() {
        let mut actions = ActionQueue::new();
        assert!(actions.is_empty());
        actions.send(PickEvent(Point::new(1, 2)));
        actions.send(PickEvent(Point::new(3, 4)));
        let bus = EventBus::new();
        actions.forward(&bus);
        let events = bus.poll();
        let picks: Vec<Point> = events
            .iter()
            .filter_map(|e| downcast_event::<PickEvent>(e).map(|p| p.0))
            .collect();
        assert_eq!(picks, vec![Point::new(1, 2), Point::new(3, 4)]);
    }
}

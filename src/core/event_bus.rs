//! Deferred event queue between widgets and the inspector.
//!
//! Widgets and hotkeys never touch the inspector directly. They emit events
//! into the bus, and the app drains the queue once per UI frame (`poll`) and
//! dispatches each event through `main_events`.
//!
//! Events come out of `poll` in emission order.

use log::warn;
use std::any::Any;
use std::sync::{Arc, Mutex};

/// Maximum events in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

/// Event bus owned by the app.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Arc<Mutex<Vec<BoxedEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the event for `poll`.
    pub fn emit<E: Event>(&self, event: E) {
        self.emit_boxed(Box::new(event));
    }

    /// Queue an already boxed event (hotkeys, widget action queues).
    pub fn emit_boxed(&self, event: BoxedEvent) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!(
                "Event queue full ({} events), evicting oldest {}",
                queue.len(),
                evict_count
            );
            queue.drain(0..evict_count);
        }
        queue.push(event);
    }

    /// Drain all queued events.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Downcast a queued event to its concrete type.
///
/// Must deref to `dyn Event` before `as_any()`: `Box<dyn Event>` itself
/// satisfies the blanket impl, and calling through it would yield the Box's
/// type id and every downcast would fail.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

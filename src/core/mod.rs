//! Core plumbing shared by widgets and the app shell.

pub mod event_bus;

pub use event_bus::{BoxedEvent, Event, EventBus, downcast_event};

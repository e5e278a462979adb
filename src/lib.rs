//! NNFI - nearest neighbor field inspector library
//!
//! Re-exports all modules for use by the binary target.

// Core plumbing (event bus)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod entities;
pub mod help;
pub mod main_events;
pub mod widgets;

pub use core::event_bus::{BoxedEvent, EventBus, downcast_event};
pub use entities::{Inspector, Interpretation, NnField, PickResult, Point, Region};

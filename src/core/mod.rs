//! Core module - wires the store, pump and background processes together

mod engine;
mod event_bus;

pub use engine::Engine;
pub use event_bus::{Event, EventBus, SimEvent};

//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after successful job order mutations. Runtime adapters implement the sink
//! to translate domain events into change-stream envelopes or UI notifications.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;

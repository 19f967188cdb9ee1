//! Multilevel priority scheduling engine.
//!
//! Owns the High/Medium/Low ready queues and the Blocked queue and advances the
//! simulation one cycle at a time, emitting structured events.

mod core;
mod event;
mod state;

pub use core::SchedulerEngine;
pub use event::{CycleOutcome, CycleReport, EventKind, ProcessRef, SchedulerEvent, Selection};
pub use state::{QueueEntry, QueueSnapshot};

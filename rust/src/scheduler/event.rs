//! Structured events and per-cycle reports emitted by the engine.

use crate::models::{ProcessRecord, QueueKind, ResourceKind};

/// What happened to a process (or the CPU) during a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Oldest blocked process returned to its ready queue
    Unblocked,
    /// Selection made by the starvation guard
    StarvationSelected,
    /// Selection made by strict priority order
    StandardSelected,
    /// Nothing was available to run
    Idle,
    /// Selected process diverted to the blocked queue by its first resource request
    Blocked,
    /// Selected process ran for one cycle
    Executed,
    /// Process ran out of cycles and left the system
    Terminated,
}

/// Identity of the process an event refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRef {
    pub id: u32,
    pub name: String,
}

impl ProcessRef {
    pub fn of(record: &ProcessRecord) -> Self {
        Self {
            id: record.id(),
            name: record.name().to_string(),
        }
    }
}

/// One entry of the event stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerEvent {
    pub cycle: u64,
    pub kind: EventKind,
    pub process: Option<ProcessRef>,
    /// Queue involved: selection source, unblock destination, or Blocked
    pub queue: Option<QueueKind>,
    pub remaining_cycles: Option<u32>,
    /// Resource requested, only set on `Blocked` events
    pub resource: Option<ResourceKind>,
}

impl SchedulerEvent {
    pub fn idle(cycle: u64) -> Self {
        Self {
            cycle,
            kind: EventKind::Idle,
            process: None,
            queue: None,
            remaining_cycles: None,
            resource: None,
        }
    }

    pub fn for_record(cycle: u64, kind: EventKind, record: &ProcessRecord, queue: QueueKind) -> Self {
        let resource = match kind {
            EventKind::Blocked => record.required_resource(),
            _ => None,
        };
        Self {
            cycle,
            kind,
            process: Some(ProcessRef::of(record)),
            queue: Some(queue),
            remaining_cycles: Some(record.remaining_cycles()),
            resource,
        }
    }
}

/// Result classification of a single cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
    Idle,
    Blocked,
    Executed,
}

/// The process chosen in a cycle and its state after the cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub id: u32,
    pub name: String,
    pub source: QueueKind,
    pub remaining_cycles: u32,
    pub terminated: bool,
}

impl Selection {
    pub(crate) fn of(record: &ProcessRecord, source: QueueKind, terminated: bool) -> Self {
        Self {
            id: record.id(),
            name: record.name().to_string(),
            source,
            remaining_cycles: record.remaining_cycles(),
            terminated,
        }
    }
}

/// Everything a driver needs to know about one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcome: CycleOutcome,
    pub selection: Option<Selection>,
    /// Events in the order they happened
    pub events: Vec<SchedulerEvent>,
}

impl CycleReport {
    pub fn has_event(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }
}

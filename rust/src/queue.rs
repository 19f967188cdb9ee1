//! FIFO process queue.

use std::collections::VecDeque;

use crate::models::{ProcessRecord, QueueKind};

/// Arrival-ordered queue of process records.
///
/// Arrival order doubles as aging order: the head is always the record that has
/// waited longest. Only tail insertion and head removal are supported.
#[derive(Clone, Debug)]
pub struct ProcessQueue {
    kind: QueueKind,
    entries: VecDeque<ProcessRecord>,
}

impl ProcessQueue {
    pub fn new(kind: QueueKind) -> Self {
        Self {
            kind,
            entries: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Insert at the tail.
    pub fn append(&mut self, record: ProcessRecord) {
        self.entries.push_back(record);
    }

    /// Remove and return the head, or `None` if the queue is empty.
    pub fn pop_front(&mut self) -> Option<ProcessRecord> {
        self.entries.pop_front()
    }

    pub fn front(&self) -> Option<&ProcessRecord> {
        self.entries.front()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.entries.iter()
    }

    pub(crate) fn contains_id(&self, id: u32) -> bool {
        self.entries.iter().any(|r| r.id() == id)
    }
}

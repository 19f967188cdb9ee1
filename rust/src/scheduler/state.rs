//! Point-in-time view of the engine's queues.

use crate::models::QueueKind;

/// One queued process as seen in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: u32,
    pub name: String,
    pub remaining_cycles: u32,
}

/// Snapshot of all four queues and the starvation counter.
///
/// Taken before a cycle runs, so `next_cycle` is the cycle about to execute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub next_cycle: u64,
    pub consecutive_high_runs: u32,
    pub high: Vec<QueueEntry>,
    pub medium: Vec<QueueEntry>,
    pub low: Vec<QueueEntry>,
    pub blocked: Vec<QueueEntry>,
}

impl QueueSnapshot {
    pub fn entries(&self, kind: QueueKind) -> &[QueueEntry] {
        match kind {
            QueueKind::High => &self.high,
            QueueKind::Medium => &self.medium,
            QueueKind::Low => &self.low,
            QueueKind::Blocked => &self.blocked,
        }
    }

    pub fn total(&self) -> usize {
        QueueKind::ALL.iter().map(|k| self.entries(*k).len()).sum()
    }
}

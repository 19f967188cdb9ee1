//! Core scheduling engine implementation.

use rustc_hash::FxHashSet;

use crate::config::EngineConfig;
use crate::models::{ProcessRecord, QueueKind};
use crate::queue::ProcessQueue;
use crate::{log_changes, log_checks, log_debug};

use super::event::{CycleOutcome, CycleReport, EventKind, SchedulerEvent, Selection};
use super::state::{QueueEntry, QueueSnapshot};

/// Selection order under the normal strict-priority policy.
const STANDARD_ORDER: [QueueKind; 3] = [QueueKind::High, QueueKind::Medium, QueueKind::Low];

/// Selection order when the starvation guard fires. High is skipped.
const STARVATION_ORDER: [QueueKind; 2] = [QueueKind::Medium, QueueKind::Low];

/// Strict-priority scheduler with a starvation guard and a one-shot resource gate.
///
/// Every live record is owned by exactly one of the four queues. Records leave the
/// engine only when their remaining cycles reach zero.
pub struct SchedulerEngine {
    high: ProcessQueue,
    medium: ProcessQueue,
    low: ProcessQueue,
    blocked: ProcessQueue,

    // Cycles started so far (the current cycle number after `run_cycle`)
    cycle: u64,
    // Consecutive cycles whose executed record came from High
    consecutive_high_runs: u32,

    // Ids of records still in the system
    live_ids: FxHashSet<u32>,

    config: EngineConfig,
}

impl SchedulerEngine {
    /// Create an empty engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            high: ProcessQueue::new(QueueKind::High),
            medium: ProcessQueue::new(QueueKind::Medium),
            low: ProcessQueue::new(QueueKind::Low),
            blocked: ProcessQueue::new(QueueKind::Blocked),
            cycle: 0,
            consecutive_high_runs: 0,
            live_ids: FxHashSet::default(),
            config,
        }
    }

    /// Place a newly loaded record at the tail of its band's ready queue.
    ///
    /// # Panics
    /// If a record with the same id is already live. Callers check `is_live` first.
    pub fn admit(&mut self, record: ProcessRecord) {
        assert!(
            self.live_ids.insert(record.id()),
            "process id {} admitted twice",
            record.id()
        );
        let target = QueueKind::ready(record.band());
        log_debug!(
            self.config.verbosity,
            "  Admitted {} into {} queue",
            record,
            target
        );
        self.queue_mut(target).append(record);
    }

    /// Run one simulated cycle.
    ///
    /// Order within a cycle: unblock the oldest blocked record, apply the starvation
    /// guard, fall back to strict priority, then either divert the selection through
    /// the resource gate or execute it.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let cycle = self.cycle;
        let verbosity = self.config.verbosity;
        let mut events: Vec<SchedulerEvent> = Vec::new();

        // Unblock step runs every cycle, before selection
        if let Some(record) = self.blocked.pop_front() {
            let target = QueueKind::ready(record.band());
            log_checks!(verbosity, "  Unblocking {} into {} queue", record, target);
            events.push(SchedulerEvent::for_record(
                cycle,
                EventKind::Unblocked,
                &record,
                target,
            ));
            self.queue_mut(target).append(record);
        }

        let mut selected: Option<(ProcessRecord, QueueKind)> = None;

        if self.consecutive_high_runs >= self.config.starvation_threshold {
            log_checks!(
                verbosity,
                "  Starvation guard active ({} consecutive High runs)",
                self.consecutive_high_runs
            );
            if let Some((record, source)) = self.pop_first(&STARVATION_ORDER) {
                self.consecutive_high_runs = 0;
                events.push(SchedulerEvent::for_record(
                    cycle,
                    EventKind::StarvationSelected,
                    &record,
                    source,
                ));
                selected = Some((record, source));
            } else {
                log_checks!(verbosity, "  Medium and Low empty, guard has nothing to pick");
            }
        }

        if selected.is_none() {
            if let Some((record, source)) = self.pop_first(&STANDARD_ORDER) {
                events.push(SchedulerEvent::for_record(
                    cycle,
                    EventKind::StandardSelected,
                    &record,
                    source,
                ));
                selected = Some((record, source));
            }
        }

        let (mut record, source) = match selected {
            Some(s) => s,
            None => {
                log_checks!(verbosity, "  Cycle {} idle", cycle);
                events.push(SchedulerEvent::idle(cycle));
                self.debug_check_ownership();
                return CycleReport {
                    cycle,
                    outcome: CycleOutcome::Idle,
                    selection: None,
                    events,
                };
            }
        };

        log_checks!(verbosity, "  Selected {} from {} queue", record, source);

        // Resource gate: first selection of a record with a requirement blocks it
        if record.needs_resource_gate() {
            record.mark_resource_requested();
            log_checks!(
                verbosity,
                "  {} requests {:?}, moving to Blocked",
                record,
                record.required_resource()
            );
            events.push(SchedulerEvent::for_record(
                cycle,
                EventKind::Blocked,
                &record,
                QueueKind::Blocked,
            ));
            let selection = Selection::of(&record, source, false);
            self.blocked.append(record);
            self.debug_check_ownership();
            return CycleReport {
                cycle,
                outcome: CycleOutcome::Blocked,
                selection: Some(selection),
                events,
            };
        }

        let remaining = record.execute_once();
        if source == QueueKind::High {
            self.consecutive_high_runs = self.consecutive_high_runs.saturating_add(1);
        } else {
            self.consecutive_high_runs = 0;
        }
        log_debug!(
            verbosity,
            "  {} ran, {} cycles left, consecutive_high_runs={}",
            record,
            remaining,
            self.consecutive_high_runs
        );
        events.push(SchedulerEvent::for_record(
            cycle,
            EventKind::Executed,
            &record,
            source,
        ));

        let terminated = remaining == 0;
        let selection = Selection::of(&record, source, terminated);
        if terminated {
            log_changes!(verbosity, "  {} terminated at cycle {}", record, cycle);
            events.push(SchedulerEvent::for_record(
                cycle,
                EventKind::Terminated,
                &record,
                source,
            ));
            self.live_ids.remove(&record.id());
        } else {
            let target = QueueKind::ready(record.band());
            self.queue_mut(target).append(record);
        }

        self.debug_check_ownership();
        CycleReport {
            cycle,
            outcome: CycleOutcome::Executed,
            selection: Some(selection),
            events,
        }
    }

    /// True when no record remains in any queue.
    pub fn all_queues_empty(&self) -> bool {
        self.high.is_empty()
            && self.medium.is_empty()
            && self.low.is_empty()
            && self.blocked.is_empty()
    }

    pub fn queue(&self, kind: QueueKind) -> &ProcessQueue {
        match kind {
            QueueKind::High => &self.high,
            QueueKind::Medium => &self.medium,
            QueueKind::Low => &self.low,
            QueueKind::Blocked => &self.blocked,
        }
    }

    /// Number of the last cycle run (0 before the first cycle).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn consecutive_high_runs(&self) -> u32 {
        self.consecutive_high_runs
    }

    pub fn live_count(&self) -> usize {
        self.live_ids.len()
    }

    pub fn is_live(&self, id: u32) -> bool {
        self.live_ids.contains(&id)
    }

    /// Queue currently holding the record with `id`, if it is still live.
    pub fn locate(&self, id: u32) -> Option<QueueKind> {
        QueueKind::ALL
            .into_iter()
            .find(|kind| self.queue(*kind).contains_id(id))
    }

    /// Capture the queues as they stand before the next cycle.
    pub fn snapshot(&self) -> QueueSnapshot {
        let entries = |kind: QueueKind| -> Vec<QueueEntry> {
            self.queue(kind)
                .iter()
                .map(|r| QueueEntry {
                    id: r.id(),
                    name: r.name().to_string(),
                    remaining_cycles: r.remaining_cycles(),
                })
                .collect()
        };
        QueueSnapshot {
            next_cycle: self.cycle + 1,
            consecutive_high_runs: self.consecutive_high_runs,
            high: entries(QueueKind::High),
            medium: entries(QueueKind::Medium),
            low: entries(QueueKind::Low),
            blocked: entries(QueueKind::Blocked),
        }
    }

    fn queue_mut(&mut self, kind: QueueKind) -> &mut ProcessQueue {
        match kind {
            QueueKind::High => &mut self.high,
            QueueKind::Medium => &mut self.medium,
            QueueKind::Low => &mut self.low,
            QueueKind::Blocked => &mut self.blocked,
        }
    }

    /// Pop the head of the first non-empty queue in `order`.
    fn pop_first(&mut self, order: &[QueueKind]) -> Option<(ProcessRecord, QueueKind)> {
        for &kind in order {
            if let Some(record) = self.queue_mut(kind).pop_front() {
                return Some((record, kind));
            }
        }
        None
    }

    fn debug_check_ownership(&self) {
        debug_assert_eq!(
            QueueKind::ALL
                .iter()
                .map(|k| self.queue(*k).len())
                .sum::<usize>(),
            self.live_ids.len(),
            "queue membership out of sync with live records"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriorityBand, ResourceKind};

    fn engine() -> SchedulerEngine {
        SchedulerEngine::new(EngineConfig::default())
    }

    fn rec(id: u32, band: PriorityBand, cycles: u32) -> ProcessRecord {
        ProcessRecord::new(id, format!("p{}", id), band, cycles, None)
    }

    fn disk(id: u32, band: PriorityBand, cycles: u32) -> ProcessRecord {
        ProcessRecord::new(id, format!("p{}", id), band, cycles, Some(ResourceKind::Disk))
    }

    fn kinds(report: &CycleReport) -> Vec<EventKind> {
        report.events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_idle_on_empty_engine() {
        let mut engine = engine();
        let report = engine.run_cycle();
        assert_eq!(report.cycle, 1);
        assert_eq!(report.outcome, CycleOutcome::Idle);
        assert!(report.selection.is_none());
        assert_eq!(kinds(&report), vec![EventKind::Idle]);
        assert!(engine.all_queues_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut engine = engine();
        engine.admit(ProcessRecord::new(1, "A", PriorityBand::High, 1, None));
        engine.admit(ProcessRecord::new(
            2,
            "B",
            PriorityBand::High,
            2,
            Some(ResourceKind::Disk),
        ));

        // Cycle 1: A runs and terminates
        let r1 = engine.run_cycle();
        assert_eq!(r1.outcome, CycleOutcome::Executed);
        let s1 = r1.selection.as_ref().unwrap();
        assert_eq!((s1.id, s1.remaining_cycles, s1.terminated), (1, 0, true));
        assert_eq!(
            kinds(&r1),
            vec![
                EventKind::StandardSelected,
                EventKind::Executed,
                EventKind::Terminated
            ]
        );
        assert_eq!(engine.consecutive_high_runs(), 1);
        assert_eq!(engine.locate(1), None);

        // Cycle 2: B hits the resource gate
        let r2 = engine.run_cycle();
        assert_eq!(r2.outcome, CycleOutcome::Blocked);
        assert_eq!(r2.selection.as_ref().unwrap().remaining_cycles, 2);
        assert_eq!(engine.consecutive_high_runs(), 1);
        assert_eq!(engine.locate(2), Some(QueueKind::Blocked));
        let blocked_event = r2.events.last().unwrap();
        assert_eq!(blocked_event.resource, Some(ResourceKind::Disk));

        // Cycle 3: B unblocked and runs in the same cycle
        let r3 = engine.run_cycle();
        assert_eq!(
            kinds(&r3),
            vec![
                EventKind::Unblocked,
                EventKind::StandardSelected,
                EventKind::Executed
            ]
        );
        assert_eq!(r3.selection.as_ref().unwrap().remaining_cycles, 1);
        assert_eq!(engine.consecutive_high_runs(), 2);
        assert_eq!(engine.locate(2), Some(QueueKind::High));

        // Cycle 4: B finishes
        let r4 = engine.run_cycle();
        assert!(r4.selection.as_ref().unwrap().terminated);
        assert!(engine.all_queues_empty());
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn test_single_cycle_record_never_seen_again() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::Low, 1));
        engine.admit(rec(2, PriorityBand::Low, 3));

        let report = engine.run_cycle();
        assert!(report.has_event(EventKind::Terminated));
        for _ in 0..5 {
            assert_eq!(engine.locate(1), None);
            let report = engine.run_cycle();
            if let Some(sel) = &report.selection {
                assert_ne!(sel.id, 1);
            }
        }
    }

    #[test]
    fn test_resource_blocks_only_on_first_selection() {
        let mut engine = engine();
        engine.admit(disk(1, PriorityBand::Medium, 3));

        let outcomes: Vec<CycleOutcome> = (0..4).map(|_| engine.run_cycle().outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                CycleOutcome::Blocked,
                CycleOutcome::Executed,
                CycleOutcome::Executed,
                CycleOutcome::Executed
            ]
        );
        assert!(engine.all_queues_empty());
    }

    #[test]
    fn test_starvation_guard_after_five_high_runs() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 100));
        engine.admit(rec(2, PriorityBand::Medium, 10));
        engine.admit(rec(3, PriorityBand::Low, 10));

        for n in 1..=5 {
            let report = engine.run_cycle();
            assert_eq!(report.selection.as_ref().unwrap().id, 1);
            assert_eq!(engine.consecutive_high_runs(), n);
        }

        let report = engine.run_cycle();
        assert!(report.has_event(EventKind::StarvationSelected));
        let sel = report.selection.as_ref().unwrap();
        assert_eq!((sel.id, sel.source), (2, QueueKind::Medium));
        assert_eq!(engine.consecutive_high_runs(), 0);

        // Back to High afterwards
        let report = engine.run_cycle();
        assert_eq!(report.selection.as_ref().unwrap().id, 1);
        assert!(report.has_event(EventKind::StandardSelected));
    }

    #[test]
    fn test_starvation_guard_falls_back_to_low() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 100));
        engine.admit(rec(3, PriorityBand::Low, 10));

        for _ in 0..5 {
            engine.run_cycle();
        }
        let report = engine.run_cycle();
        let sel = report.selection.as_ref().unwrap();
        assert_eq!((sel.id, sel.source), (3, QueueKind::Low));
        assert!(report.has_event(EventKind::StarvationSelected));
    }

    #[test]
    fn test_starvation_guard_with_nothing_below_high() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 20));

        for _ in 0..5 {
            engine.run_cycle();
        }
        // Guard finds nothing, High keeps running and the counter keeps growing
        let report = engine.run_cycle();
        assert!(!report.has_event(EventKind::StarvationSelected));
        assert_eq!(report.selection.as_ref().unwrap().source, QueueKind::High);
        assert_eq!(engine.consecutive_high_runs(), 6);
    }

    #[test]
    fn test_blocked_cycles_do_not_count_as_high_runs() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 100));
        for id in 2..=5 {
            engine.admit(disk(id, PriorityBand::High, 5));
        }
        engine.admit(rec(9, PriorityBand::Medium, 5));

        // p1 runs, p2..p5 each block once, interleaved with unblocks
        let mut high_executions = 0;
        let mut cycles = 0;
        while high_executions < 5 {
            let report = engine.run_cycle();
            cycles += 1;
            if report.outcome == CycleOutcome::Executed {
                assert_eq!(report.selection.as_ref().unwrap().source, QueueKind::High);
                high_executions += 1;
            }
        }
        assert!(cycles > 5);
        assert_eq!(engine.consecutive_high_runs(), 5);

        // Next selection is forced to Medium even though High is non-empty
        assert!(!engine.queue(QueueKind::High).is_empty());
        let report = engine.run_cycle();
        let sel = report.selection.as_ref().unwrap();
        assert_eq!((sel.id, sel.source), (9, QueueKind::Medium));
    }

    #[test]
    fn test_configurable_starvation_threshold() {
        let mut engine = SchedulerEngine::new(EngineConfig {
            starvation_threshold: 2,
            verbosity: 0,
        });
        engine.admit(rec(1, PriorityBand::High, 10));
        engine.admit(rec(2, PriorityBand::Medium, 10));

        let ids: Vec<u32> = (0..6)
            .map(|_| engine.run_cycle().selection.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 1, 2, 1, 1, 2]);
    }

    #[test]
    fn test_unblocked_record_lands_at_tail() {
        let mut engine = engine();
        engine.admit(disk(1, PriorityBand::High, 2));
        engine.admit(rec(2, PriorityBand::High, 5));

        // Cycle 1: p1 blocks
        assert_eq!(engine.run_cycle().outcome, CycleOutcome::Blocked);

        // Cycle 2: p1 unblocked behind p2, so p2 runs
        let report = engine.run_cycle();
        assert_eq!(kinds(&report)[0], EventKind::Unblocked);
        assert_eq!(report.selection.as_ref().unwrap().id, 2);
        let high: Vec<u32> = engine.queue(QueueKind::High).iter().map(|r| r.id()).collect();
        assert_eq!(high, vec![1, 2]);
    }

    #[test]
    fn test_unblock_happens_even_when_cycle_blocks() {
        let mut engine = engine();
        engine.admit(disk(1, PriorityBand::Low, 1));
        engine.admit(disk(2, PriorityBand::Low, 1));

        assert_eq!(engine.run_cycle().outcome, CycleOutcome::Blocked);
        // p1 returns to Low tail, p2 is selected and blocks
        let report = engine.run_cycle();
        assert_eq!(
            kinds(&report),
            vec![
                EventKind::Unblocked,
                EventKind::StandardSelected,
                EventKind::Blocked
            ]
        );
        assert_eq!(engine.locate(1), Some(QueueKind::Low));
        assert_eq!(engine.locate(2), Some(QueueKind::Blocked));
    }

    #[test]
    fn test_priority_order() {
        let mut engine = engine();
        engine.admit(rec(3, PriorityBand::Low, 1));
        engine.admit(rec(2, PriorityBand::Medium, 1));
        engine.admit(rec(1, PriorityBand::High, 1));

        let ids: Vec<u32> = (0..3)
            .map(|_| engine.run_cycle().selection.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(engine.run_cycle().outcome, CycleOutcome::Idle);
    }

    #[test]
    fn test_non_high_execution_resets_counter() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 2));
        engine.admit(rec(2, PriorityBand::Medium, 2));

        engine.run_cycle();
        engine.run_cycle();
        assert_eq!(engine.consecutive_high_runs(), 2);
        engine.run_cycle();
        assert_eq!(engine.consecutive_high_runs(), 0);
    }

    #[test]
    fn test_snapshot_reflects_queues() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 2));
        engine.admit(disk(2, PriorityBand::Low, 4));
        engine.run_cycle();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.next_cycle, 2);
        assert_eq!(snapshot.consecutive_high_runs, 1);
        assert_eq!(snapshot.high.len(), 1);
        assert_eq!(snapshot.high[0].remaining_cycles, 1);
        assert_eq!(snapshot.low.len(), 1);
        assert_eq!(snapshot.total(), 2);
    }

    #[test]
    #[should_panic(expected = "admitted twice")]
    fn test_duplicate_admit_panics() {
        let mut engine = engine();
        engine.admit(rec(1, PriorityBand::High, 2));
        engine.admit(rec(1, PriorityBand::Low, 2));
    }
}

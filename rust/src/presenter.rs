//! Text rendering of engine events and queue state.

use crate::models::QueueKind;
use crate::scheduler::{CycleReport, EventKind, QueueEntry, QueueSnapshot, SchedulerEvent};
use crate::simulation::RunSummary;

pub const START_BANNER: &str = "=== Starting scheduler simulation ===";
pub const CYCLE_SEPARATOR: &str = "---";

/// Render one event as a log line.
pub fn render_event(event: &SchedulerEvent) -> String {
    let who = match &event.process {
        Some(p) => format!("{}(id={})", p.name, p.id),
        None => String::new(),
    };
    let queue = event.queue.map(QueueKind::label).unwrap_or("?");
    let remaining = event.remaining_cycles.unwrap_or(0);

    let body = match event.kind {
        EventKind::Unblocked => format!("Unblocked: {} re-queued into {} queue", who, queue),
        EventKind::StarvationSelected => format!(
            "Anti-starvation rule applied. Selected from {} queue: {}",
            queue, who
        ),
        EventKind::StandardSelected => format!("Selected from {} queue: {}", queue, who),
        EventKind::Idle => "No process available to run.".to_string(),
        EventKind::Blocked => {
            let resource = event.resource.map(|r| r.label()).unwrap_or("resource");
            format!(
                "Process {} requested {} for the first time -> moved to Blocked",
                who, resource
            )
        }
        EventKind::Executed => format!("Running {} -> remaining cycles: {}", who, remaining),
        EventKind::Terminated => format!("Process {} finished and leaves the system", who),
    };
    format!("[cycle {}] {}", event.cycle, body)
}

/// Render every event of a cycle, in order.
pub fn render_report(report: &CycleReport) -> Vec<String> {
    report.events.iter().map(render_event).collect()
}

/// Render a whole cycle block: optional queue dump, event lines, then the separator.
pub fn render_cycle(snapshot: Option<&QueueSnapshot>, report: &CycleReport) -> Vec<String> {
    let mut lines = snapshot.map(render_snapshot).unwrap_or_default();
    lines.extend(render_report(report));
    lines.push(CYCLE_SEPARATOR.to_string());
    lines
}

fn render_entries(entries: &[QueueEntry]) -> String {
    if entries.is_empty() {
        return "(empty)".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{}(id={},c={})", e.name, e.id, e.remaining_cycles))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Render the queue dump printed before a cycle.
pub fn render_snapshot(snapshot: &QueueSnapshot) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);
    lines.push(format!("Queues at start of cycle {}:", snapshot.next_cycle));
    for kind in QueueKind::ALL {
        lines.push(format!(
            "  {}: {}",
            kind.label(),
            render_entries(snapshot.entries(kind))
        ));
    }
    lines.push(format!(
        "  consecutive_high_runs = {}",
        snapshot.consecutive_high_runs
    ));
    lines
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut line = format!(
        "=== Simulation finished after {} cycles ===",
        summary.cycles_run
    );
    if summary.hit_cycle_limit {
        line.push_str(" (cycle limit reached)");
    }
    line
}

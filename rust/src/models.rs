//! Core data types for the scheduling simulation.

use std::fmt;

/// Priority band of a process. Determines which ready queue it lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriorityBand {
    High,
    Medium,
    Low,
}

impl PriorityBand {
    /// Map a numeric priority level to a band.
    ///
    /// 1 is High, 2 is Medium, and every other value falls into Low.
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => PriorityBand::High,
            2 => PriorityBand::Medium,
            _ => PriorityBand::Low,
        }
    }

    /// Numeric level of the band (1-3).
    pub fn level(self) -> u8 {
        match self {
            PriorityBand::High => 1,
            PriorityBand::Medium => 2,
            PriorityBand::Low => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityBand::High => "High",
            PriorityBand::Medium => "Medium",
            PriorityBand::Low => "Low",
        }
    }
}

impl fmt::Display for PriorityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resource a process may request once during its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Disk,
}

impl ResourceKind {
    /// Look up a resource by name, ignoring case and surrounding whitespace.
    ///
    /// "DISCO" is accepted as a legacy spelling of DISK. Returns `None` for empty
    /// and unrecognized names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DISK" | "DISCO" => Some(ResourceKind::Disk),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Disk => "DISK",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one of the four queues owned by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueueKind {
    High,
    Medium,
    Low,
    Blocked,
}

impl QueueKind {
    /// Ready queue that holds processes of the given band.
    pub fn ready(band: PriorityBand) -> Self {
        match band {
            PriorityBand::High => QueueKind::High,
            PriorityBand::Medium => QueueKind::Medium,
            PriorityBand::Low => QueueKind::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueueKind::High => "High",
            QueueKind::Medium => "Medium",
            QueueKind::Low => "Low",
            QueueKind::Blocked => "Blocked",
        }
    }

    /// All queues in display order.
    pub const ALL: [QueueKind; 4] = [
        QueueKind::High,
        QueueKind::Medium,
        QueueKind::Low,
        QueueKind::Blocked,
    ];
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A schedulable unit of work.
///
/// Identity, name, band and resource requirement are fixed at construction.
/// Only the engine advances `remaining_cycles` and the resource-request flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRecord {
    id: u32,
    name: String,
    band: PriorityBand,
    remaining_cycles: u32,
    required_resource: Option<ResourceKind>,
    has_requested_resource: bool,
}

impl ProcessRecord {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        band: PriorityBand,
        remaining_cycles: u32,
        required_resource: Option<ResourceKind>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            band,
            remaining_cycles,
            required_resource,
            has_requested_resource: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn band(&self) -> PriorityBand {
        self.band
    }

    pub fn remaining_cycles(&self) -> u32 {
        self.remaining_cycles
    }

    pub fn required_resource(&self) -> Option<ResourceKind> {
        self.required_resource
    }

    pub fn has_requested_resource(&self) -> bool {
        self.has_requested_resource
    }

    /// True when selecting this record must divert it to the blocked queue.
    pub fn needs_resource_gate(&self) -> bool {
        self.required_resource.is_some() && !self.has_requested_resource
    }

    /// Record the one-time resource request. The flag is never cleared.
    pub(crate) fn mark_resource_requested(&mut self) {
        self.has_requested_resource = true;
    }

    /// Consume one cycle of work and return the cycles left.
    ///
    /// A record loaded with zero cycles stays at zero and terminates on its first run.
    pub(crate) fn execute_once(&mut self) -> u32 {
        self.remaining_cycles = self.remaining_cycles.saturating_sub(1);
        self.remaining_cycles
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_cycles == 0
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(id={})", self.name, self.id)
    }
}

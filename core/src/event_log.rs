//! Append-only notable-event feed for a session.
//!
//! RULE: Only the engine appends. Collaborators read, newest-last,
//! and keep their own cursor (`since`) to render incrementally.

use crate::{
    event::{EventLogEntry, Severity, SimEvent},
    types::Tick,
};

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self { entries: Vec::new(), next_id: 1 }
    }

    /// Append one event and return its id.
    pub fn append(&mut self, tick: Tick, label: String, event: SimEvent) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.entries.push(EventLogEntry {
            id,
            tick,
            label,
            severity: event.severity(),
            text: event.describe(),
            event,
        });
        id
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    /// Entries with id strictly greater than `after_id`.
    pub fn since(&self, after_id: u64) -> &[EventLogEntry] {
        let start = self.entries.partition_point(|e| e.id <= after_id);
        &self.entries[start..]
    }

    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.entries.iter().filter(|e| e.tick == tick).collect()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter().filter(move |e| e.severity == severity)
    }

    /// The `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> &[EventLogEntry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    pub fn latest(&self) -> Option<&EventLogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Ids keep counting so stale cursors stay valid.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_since_is_exclusive() {
        let mut log = EventLog::new();
        let a = log.append(1, "25y1m".into(), SimEvent::Paused { tick: 1 });
        let b = log.append(1, "25y1m".into(), SimEvent::Resumed { tick: 1 });
        let c = log.append(2, "25y2m".into(), SimEvent::BonusPaid { tick: 2, amount: 10.0 });
        assert!(a < b && b < c);
        assert_eq!(log.since(a).len(), 2);
        assert_eq!(log.since(c).len(), 0);
        assert_eq!(log.events_for_tick(1).len(), 2);
        assert_eq!(log.with_severity(Severity::Milestone).count(), 1);
        assert_eq!(log.latest().map(|e| e.id), Some(c));
    }

    #[test]
    fn clear_keeps_id_sequence() {
        let mut log = EventLog::new();
        let first = log.append(0, "start".into(), SimEvent::Paused { tick: 0 });
        log.clear();
        let second = log.append(0, "start".into(), SimEvent::Paused { tick: 0 });
        assert!(second > first);
        assert_eq!(log.len(), 1);
    }
}

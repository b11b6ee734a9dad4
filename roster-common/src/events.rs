//! Roster events pushed to subscribers
//!
//! The broadcast coordinator publishes one [`RosterSnapshot`] per successful
//! mutation. Each snapshot is the complete ordered roster at one point in
//! time; subscribers replace their local copy with it rather than merging.
//!
//! A snapshot fans out to two wire events on the push channel:
//! - `students_updated`: the full ordered roster
//! - `counts_updated`: per-grade counts derived from the same roster

use std::sync::Arc;

use crate::models::{GradeCounts, StudentRecord};

/// Event name carrying the full roster
pub const STUDENTS_UPDATED: &str = "students_updated";

/// Event name carrying per-grade counts
pub const COUNTS_UPDATED: &str = "counts_updated";

/// Event name sent once when a subscriber connects
pub const CONNECTION_STATUS: &str = "ConnectionStatus";

/// One immutable copy of the roster
///
/// The record list is shared behind an `Arc` because the broadcast channel
/// clones the message once per subscriber.
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    /// Monotonically increasing per coordinator, starting at 1
    pub sequence: u64,
    pub students: Arc<Vec<StudentRecord>>,
}

impl RosterSnapshot {
    pub fn new(sequence: u64, students: Vec<StudentRecord>) -> Self {
        Self {
            sequence,
            students: Arc::new(students),
        }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn counts(&self) -> GradeCounts {
        GradeCounts::from_records(self.students.iter())
    }

    /// Wire events for this snapshot, in delivery order
    pub fn events(&self) -> [RosterEvent; 2] {
        [
            RosterEvent::StudentsUpdated {
                sequence: self.sequence,
                students: Arc::clone(&self.students),
            },
            RosterEvent::CountsUpdated {
                sequence: self.sequence,
                counts: self.counts(),
            },
        ]
    }
}

/// A single event on the push channel
#[derive(Debug, Clone)]
pub enum RosterEvent {
    StudentsUpdated {
        sequence: u64,
        students: Arc<Vec<StudentRecord>>,
    },
    CountsUpdated {
        sequence: u64,
        counts: GradeCounts,
    },
}

impl RosterEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            RosterEvent::StudentsUpdated { .. } => STUDENTS_UPDATED,
            RosterEvent::CountsUpdated { .. } => COUNTS_UPDATED,
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            RosterEvent::StudentsUpdated { sequence, .. }
            | RosterEvent::CountsUpdated { sequence, .. } => *sequence,
        }
    }

    /// Serialize the event payload (the roster array or the counts object)
    pub fn payload_json(&self) -> serde_json::Result<String> {
        match self {
            RosterEvent::StudentsUpdated { students, .. } => serde_json::to_string(students.as_ref()),
            RosterEvent::CountsUpdated { counts, .. } => serde_json::to_string(counts),
        }
    }
}

//! Reversible event-log operations backing undo and redo.

use serde::{Deserialize, Serialize};

use crate::{event::EventRecord, types::EventId};

/// One log mutation. Applying an op yields the op that reverses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Put a fully materialized event back under its own id.
    Insert {
        /// Event to insert.
        event: EventRecord,
    },
    /// Overwrite an existing event with a previous version of itself.
    Restore {
        /// Version to restore.
        event: EventRecord,
    },
    /// Remove an event.
    Remove {
        /// Event to remove.
        id: EventId,
    },
}

impl Op {
    /// Event the op touches.
    pub fn event_id(&self) -> EventId {
        match self {
            Op::Insert { event } | Op::Restore { event } => event.id,
            Op::Remove { id } => *id,
        }
    }
}

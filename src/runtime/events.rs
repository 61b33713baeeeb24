//! Session change notifications for display collaborators.

use crate::types::{EventId, MatchPeriod};

/// Events emitted from the single-writer session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A play period began.
    PeriodStarted {
        /// Period now running.
        period: MatchPeriod,
    },
    /// A play period finished.
    PeriodEnded {
        /// Period that ended.
        period: MatchPeriod,
        /// Frozen elapsed time of the ended period.
        elapsed_secs: u32,
    },
    /// The clock was paused.
    Paused,
    /// The clock was resumed.
    Resumed,
    /// The host went away with the clock running.
    Suspended,
    /// Time away was folded out of play.
    Reconciled,
    /// The clock returned to `NotStarted`.
    Reset,
    /// An event was recorded.
    Recorded {
        /// New event id.
        id: EventId,
    },
    /// An event was edited.
    Edited {
        /// Edited event id.
        id: EventId,
    },
    /// An event was deleted.
    Deleted {
        /// Deleted event id.
        id: EventId,
    },
    /// One undo step was applied to the given event.
    UndoApplied {
        /// Event affected.
        id: EventId,
    },
    /// One redo step was applied to the given event.
    RedoApplied {
        /// Event affected.
        id: EventId,
    },
    /// The latest state reached the repository.
    Saved,
    /// A save failed; in-memory state is untouched.
    SaveFailed {
        /// Error description.
        message: String,
    },
}

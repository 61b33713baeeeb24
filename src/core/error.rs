use thiserror::Error;

use crate::{
    event::{EventKind, FieldMismatch},
    types::{EventId, MatchPeriod, SportVariant, TeamId},
};

/// Clock or log operation a [`MatchError::InvalidTransition`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `start_period`.
    StartPeriod,
    /// `end_period`.
    EndPeriod,
    /// `pause`.
    Pause,
    /// `resume`.
    Resume,
    /// `record`.
    Record,
    /// Changing the extra-time setting.
    ConfigureExtraTime,
}

/// Errors raised by match clock and event log operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Operation not allowed in the current period or clock state.
    #[error("cannot {action:?} during {period:?}")]
    InvalidTransition {
        /// Operation attempted.
        action: Action,
        /// Period at the time.
        period: MatchPeriod,
    },
    /// No event with this id.
    #[error("event {0} not found")]
    NotFound(EventId),
    /// Outcome or shot type not played in this code.
    #[error("{detail} is not played in {variant:?}")]
    UnsupportedOutcome {
        /// Code being played.
        variant: SportVariant,
        /// Label of the rejected outcome or shot type.
        detail: &'static str,
    },
    /// PeriodStart/PeriodEnd events are owned by the clock.
    #[error("event {0} was created by the match clock and cannot be changed")]
    ClockEventLocked(EventId),
    /// Patch field does not belong to the event's kind.
    #[error("field `{field}` does not apply to {kind:?} event {id}")]
    KindMismatch {
        /// Event being edited.
        id: EventId,
        /// Its kind.
        kind: EventKind,
        /// Offending patch field.
        field: &'static str,
    },
    /// Team is neither side of the match.
    #[error("team {0} is not playing in this match")]
    UnknownTeam(TeamId),
    /// Event id already present.
    #[error("event {0} already exists")]
    AlreadyExists(EventId),
    /// Undo history is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// Redo history is empty.
    #[error("nothing to redo")]
    NothingToRedo,
}

impl MatchError {
    pub(crate) fn kind_mismatch(id: EventId, mismatch: FieldMismatch) -> Self {
        Self::KindMismatch {
            id,
            kind: mismatch.kind,
            field: mismatch.field,
        }
    }
}

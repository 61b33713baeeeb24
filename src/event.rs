//! Match event record, draft, payload, and patch types.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{EventId, MatchPeriod, PlayerId, SportVariant, TeamId};

/// Result of a shot at goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Under the bar, worth 3.
    Goal,
    /// Over the bar, worth 1.
    Point,
    /// Over the bar from outside the arc, worth 2. Football only.
    TwoPointer,
    /// Missed wide.
    Wide,
    /// Stopped by the keeper.
    Saved,
    /// Fell short into the keeper's hands or the square.
    DroppedShort,
    /// Struck the upright and stayed in play.
    OffPost,
}

impl ShotOutcome {
    /// Score value of the outcome; zero for misses.
    pub fn points(self) -> u32 {
        match self {
            Self::Goal => 3,
            Self::TwoPointer => 2,
            Self::Point => 1,
            Self::Wide | Self::Saved | Self::DroppedShort | Self::OffPost => 0,
        }
    }

    /// True when the outcome adds to the score.
    pub fn is_score(self) -> bool {
        self.points() > 0
    }

    /// False for a two-pointer outside men's football.
    pub fn is_supported_by(self, variant: SportVariant) -> bool {
        self != Self::TwoPointer || variant.supports_two_pointer()
    }
}

/// How the shot came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotType {
    /// Open play.
    FromPlay,
    /// Free kick or puck.
    Free,
    /// Penalty.
    Penalty,
    /// The end-line restart: a 45 in football, a 65 in the stick codes.
    FortyFive,
    /// Sideline kick or cut.
    Sideline,
    /// Free from a clean catch. Football codes only.
    Mark,
}

impl ShotType {
    /// False for a mark outside the football codes.
    pub fn is_supported_by(self, variant: SportVariant) -> bool {
        self != Self::Mark || variant.supports_mark()
    }

    /// Display label in the given code.
    pub fn label(self, variant: SportVariant) -> &'static str {
        match self {
            Self::FromPlay => "From Play",
            Self::Free => "Free",
            Self::Penalty => "Penalty",
            Self::FortyFive if variant.is_stick_code() => "65m",
            Self::FortyFive => "45m",
            Self::Sideline => "Sideline",
            Self::Mark => "Mark",
        }
    }
}

/// Disciplinary card colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Caution.
    Yellow,
    /// Sending off.
    Red,
    /// Sin bin.
    Black,
}

/// What the foul gave away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoulOutcome {
    /// Free awarded.
    Free,
    /// Penalty awarded.
    Penalty,
}

/// Payload-free discriminant of [`EventPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Attempt at goal.
    Shot,
    /// Player change.
    Substitution,
    /// Goalkeeper restart.
    Kickout,
    /// Disciplinary card.
    Card,
    /// Foul given away.
    FoulConceded,
    /// Period began.
    PeriodStart,
    /// Period finished.
    PeriodEnd,
    /// Free-text note.
    Note,
}

impl EventKind {
    /// True for kinds only the match clock may create.
    pub fn is_clock_generated(self) -> bool {
        matches!(self, Self::PeriodStart | Self::PeriodEnd)
    }
}

/// Kind-specific event data. Fields of one kind cannot appear on another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Attempt at goal.
    Shot {
        /// Result of the attempt.
        outcome: ShotOutcome,
        /// Origin of the attempt, when recorded.
        shot_type: Option<ShotType>,
    },
    /// Player change.
    Substitution {
        /// Player leaving the field.
        off: Option<PlayerId>,
        /// Player coming on.
        on: Option<PlayerId>,
    },
    /// Restart from the goalkeeper.
    Kickout {
        /// True when the kicking team kept possession.
        won_own: bool,
    },
    /// Disciplinary card.
    Card {
        /// Card colour.
        card: CardType,
    },
    /// Foul given against the event's team.
    FoulConceded {
        /// Award to the opposition.
        outcome: FoulOutcome,
    },
    /// Clock started a play period.
    PeriodStart,
    /// Clock stopped a play period.
    PeriodEnd,
    /// Free-text note.
    Note {
        /// Note body.
        text: String,
    },
}

impl EventPayload {
    /// Kind of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Shot { .. } => EventKind::Shot,
            Self::Substitution { .. } => EventKind::Substitution,
            Self::Kickout { .. } => EventKind::Kickout,
            Self::Card { .. } => EventKind::Card,
            Self::FoulConceded { .. } => EventKind::FoulConceded,
            Self::PeriodStart => EventKind::PeriodStart,
            Self::PeriodEnd => EventKind::PeriodEnd,
            Self::Note { .. } => EventKind::Note,
        }
    }

    /// Shot outcome when this is a shot.
    pub fn shot_outcome(&self) -> Option<ShotOutcome> {
        match self {
            Self::Shot { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }

    /// Returns the first field the sport variant does not allow, if any.
    pub fn unsupported_by(&self, variant: SportVariant) -> Option<&'static str> {
        let Self::Shot { outcome, shot_type } = self else {
            return None;
        };
        if !outcome.is_supported_by(variant) {
            return Some("two-pointer");
        }
        match shot_type {
            Some(t) if !t.is_supported_by(variant) => Some("mark"),
            _ => None,
        }
    }
}

/// Fully materialized event as held by the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Stable event identifier; also the insertion ordinal.
    pub id: EventId,
    /// Kind-specific data.
    pub payload: EventPayload,
    /// Period the event happened in.
    pub period: MatchPeriod,
    /// Seconds into `period`.
    pub elapsed_secs: u32,
    /// Side the event is credited to.
    pub team: Option<TeamId>,
    /// Primary player involved (scorer, carded player, kickout taker).
    pub player: Option<PlayerId>,
    /// Free-text annotation.
    pub annotation: Option<String>,
}

impl EventRecord {
    /// Kind of the event.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Sort key for chronological order, excluding the insertion tie-break.
    pub fn match_time(&self) -> (MatchPeriod, u32) {
        (self.period, self.elapsed_secs)
    }

    /// True when `self` happened at or before `cutoff` in match time.
    pub fn is_at_or_before(&self, cutoff: &EventRecord) -> bool {
        self.match_time() <= cutoff.match_time()
    }
}

/// Insert payload; the log stamps id, period, and elapsed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Kind-specific data.
    pub payload: EventPayload,
    /// Side the event is credited to.
    pub team: Option<TeamId>,
    /// Primary player involved.
    pub player: Option<PlayerId>,
    /// Free-text annotation.
    pub annotation: Option<String>,
}

impl EventDraft {
    /// Draft with no team, player, or annotation.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            team: None,
            player: None,
            annotation: None,
        }
    }

    /// Shot draft credited to `team`.
    pub fn shot(team: TeamId, outcome: ShotOutcome) -> Self {
        Self::new(EventPayload::Shot {
            outcome,
            shot_type: None,
        })
        .for_team(team)
    }

    /// Credits the draft to `team`.
    pub fn for_team(mut self, team: TeamId) -> Self {
        self.team = Some(team);
        self
    }

    /// Sets the primary player.
    pub fn by_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Attaches an annotation.
    pub fn annotated(mut self, text: impl Into<String>) -> Self {
        self.annotation = Some(text.into());
        self
    }
}

/// Event field a patch tried to set on a kind that does not carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMismatch {
    /// Kind of the event being patched.
    pub kind: EventKind,
    /// Name of the rejected field.
    pub field: &'static str,
}

/// Sparse patch where each `Some` field overwrites the record value.
///
/// Payload fields only apply to events of the matching kind; id, kind,
/// period, and elapsed time are never patchable. Optional record fields take
/// `Some(None)` to clear them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventPatch {
    /// Replacement shot outcome.
    pub shot_outcome: Option<ShotOutcome>,
    /// Replacement shot type, or `Some(None)` to clear it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub shot_type: Option<Option<ShotType>>,
    /// Replacement substitution player leaving.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_off: Option<Option<PlayerId>>,
    /// Replacement substitution player coming on.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_on: Option<Option<PlayerId>>,
    /// Replacement kickout result.
    pub won_own_kickout: Option<bool>,
    /// Replacement card colour.
    pub card: Option<CardType>,
    /// Replacement foul award.
    pub foul_outcome: Option<FoulOutcome>,
    /// Replacement note body.
    pub note_text: Option<String>,
    /// Replacement team.
    pub team: Option<TeamId>,
    /// Replacement primary player, or `Some(None)` to deselect.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub player: Option<Option<PlayerId>>,
    /// Replacement annotation, or `Some(None)` to remove it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotation: Option<Option<String>>,
}

/// A field that is present in the input, even as `null`, is a change.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl EventPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Checks every payload field against the kind of `rec`.
    pub fn check_kind(&self, rec: &EventRecord) -> Result<(), FieldMismatch> {
        let kind = rec.kind();
        let fields: [(&'static str, bool, EventKind); 8] = [
            ("shot_outcome", self.shot_outcome.is_some(), EventKind::Shot),
            ("shot_type", self.shot_type.is_some(), EventKind::Shot),
            ("sub_off", self.sub_off.is_some(), EventKind::Substitution),
            ("sub_on", self.sub_on.is_some(), EventKind::Substitution),
            ("won_own_kickout", self.won_own_kickout.is_some(), EventKind::Kickout),
            ("card", self.card.is_some(), EventKind::Card),
            ("foul_outcome", self.foul_outcome.is_some(), EventKind::FoulConceded),
            ("note_text", self.note_text.is_some(), EventKind::Note),
        ];
        match fields.iter().find(|(_, set, owner)| *set && *owner != kind) {
            Some((field, _, _)) => Err(FieldMismatch { kind, field }),
            None => Ok(()),
        }
    }

    /// Applies this patch in place to `rec`, ignoring fields of other kinds.
    pub fn apply_to(&self, rec: &mut EventRecord) {
        match &mut rec.payload {
            EventPayload::Shot { outcome, shot_type } => {
                if let Some(v) = self.shot_outcome {
                    *outcome = v;
                }
                if let Some(v) = self.shot_type {
                    *shot_type = v;
                }
            }
            EventPayload::Substitution { off, on } => {
                if let Some(v) = self.sub_off {
                    *off = v;
                }
                if let Some(v) = self.sub_on {
                    *on = v;
                }
            }
            EventPayload::Kickout { won_own } => {
                if let Some(v) = self.won_own_kickout {
                    *won_own = v;
                }
            }
            EventPayload::Card { card } => {
                if let Some(v) = self.card {
                    *card = v;
                }
            }
            EventPayload::FoulConceded { outcome } => {
                if let Some(v) = self.foul_outcome {
                    *outcome = v;
                }
            }
            EventPayload::Note { text } => {
                if let Some(v) = &self.note_text {
                    *text = v.clone();
                }
            }
            EventPayload::PeriodStart | EventPayload::PeriodEnd => {}
        }
        if let Some(v) = self.team {
            rec.team = Some(v);
        }
        if let Some(v) = self.player {
            rec.player = v;
        }
        if let Some(v) = &self.annotation {
            rec.annotation = v.clone();
        }
    }
}

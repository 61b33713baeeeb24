use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    event::{EventDraft, EventKind, EventPatch, EventPayload, EventRecord},
    op::Op,
    types::{EventId, MatchPeriod, TeamId},
};

use super::{error::MatchError, indices::VecIndex};

/// Chronological view over the log. Cloning restarts the walk.
pub type Chronological<'a> = std::vec::IntoIter<&'a EventRecord>;
/// Reverse of [`Chronological`].
pub type RecentFirst<'a> = std::iter::Rev<Chronological<'a>>;

/// Persistable form of an [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogSnapshotV1 {
    /// Id the next recorded event will take.
    pub next_event_id: EventId,
    /// Events in insertion order.
    pub events: Vec<EventRecord>,
}

/// Ordered event collection for one match, with undo/redo of UI edits.
///
/// Events are kept in insertion (id) order; display order is always computed.
#[derive(Debug, Default)]
pub struct EventLog {
    records: HashMap<EventId, EventRecord>,
    order: Vec<EventId>,
    by_team: VecIndex<TeamId>,
    undo: Vec<Op>,
    redo: Vec<Op>,
    next_event_id: EventId,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self {
            next_event_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a log from a snapshot. Undo history starts empty.
    pub fn from_snapshot(snapshot: EventLogSnapshotV1) -> Result<Self, MatchError> {
        let mut log = Self::new();
        for event in snapshot.events {
            log.apply_op(Op::Insert { event })?;
        }
        log.next_event_id = log.next_event_id.max(snapshot.next_event_id);
        Ok(log)
    }

    /// Captures the events and id counter.
    pub fn export_snapshot(&self) -> EventLogSnapshotV1 {
        EventLogSnapshotV1 {
            next_event_id: self.next_event_id,
            events: self.iter().cloned().collect(),
        }
    }

    /// Stamps `draft` with `period`/`elapsed_secs` and appends it as an undoable step.
    ///
    /// Period and team legality are the caller's concern.
    pub fn insert(
        &mut self,
        period: MatchPeriod,
        elapsed_secs: u32,
        draft: EventDraft,
    ) -> Result<EventId, MatchError> {
        let event = self.stamp(period, elapsed_secs, draft);
        let id = event.id;
        let inverse = self.apply_op(Op::Insert { event })?;
        self.push_undo(inverse);
        debug!(id, ?period, elapsed_secs, "event recorded");
        Ok(id)
    }

    /// Appends a clock-generated event. These never enter the undo history.
    pub fn append_clock_event(
        &mut self,
        kind: EventKind,
        period: MatchPeriod,
        elapsed_secs: u32,
    ) -> Result<EventId, MatchError> {
        let payload = match kind {
            EventKind::PeriodStart => EventPayload::PeriodStart,
            _ => EventPayload::PeriodEnd,
        };
        let event = self.stamp(period, elapsed_secs, EventDraft::new(payload));
        let id = event.id;
        self.apply_op(Op::Insert { event })?;
        Ok(id)
    }

    /// Applies `patch` to the event with `id`. Never touches id, kind, or match time.
    pub fn edit(&mut self, id: EventId, patch: &EventPatch) -> Result<(), MatchError> {
        let current = self.records.get(&id).ok_or(MatchError::NotFound(id))?;
        if current.kind().is_clock_generated() {
            return Err(MatchError::ClockEventLocked(id));
        }
        patch
            .check_kind(current)
            .map_err(|m| MatchError::kind_mismatch(id, m))?;

        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        let inverse = self.apply_op(Op::Restore { event: updated })?;
        self.push_undo(inverse);
        debug!(id, "event edited");
        Ok(())
    }

    /// Removes the event with `id`, returning it.
    pub fn delete(&mut self, id: EventId) -> Result<EventRecord, MatchError> {
        let current = self.records.get(&id).ok_or(MatchError::NotFound(id))?;
        if current.kind().is_clock_generated() {
            return Err(MatchError::ClockEventLocked(id));
        }
        let removed = current.clone();
        let inverse = self.apply_op(Op::Remove { id })?;
        self.push_undo(inverse);
        debug!(id, "event deleted");
        Ok(removed)
    }

    /// Reverts the latest recorded, edited, or deleted event; returns its id.
    pub fn undo(&mut self) -> Result<EventId, MatchError> {
        let op = self.undo.pop().ok_or(MatchError::NothingToUndo)?;
        let id = op.event_id();
        let inverse = self.apply_op(op)?;
        self.redo.push(inverse);
        debug!(id, "undo applied");
        Ok(id)
    }

    /// Reapplies the latest undone step; returns its id.
    pub fn redo(&mut self) -> Result<EventId, MatchError> {
        let op = self.redo.pop().ok_or(MatchError::NothingToRedo)?;
        let id = op.event_id();
        let inverse = self.apply_op(op)?;
        self.undo.push(inverse);
        debug!(id, "redo applied");
        Ok(id)
    }

    /// Event with `id`, if present.
    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.records.get(&id)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no events are held.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Events ordered by period, then elapsed time, then insertion order.
    pub fn chronological(&self) -> Chronological<'_> {
        let mut events: Vec<&EventRecord> = self.iter().collect();
        // Stable: equal match times keep insertion order.
        events.sort_by_key(|e| e.match_time());
        events.into_iter()
    }

    /// Exact reverse of [`EventLog::chronological`].
    pub fn recent_first(&self) -> RecentFirst<'_> {
        self.chronological().rev()
    }

    /// Chronologically last event, if any.
    pub fn latest(&self) -> Option<&EventRecord> {
        self.chronological().next_back()
    }

    /// Events credited to `team`, in insertion order.
    pub fn by_team(&self, team: TeamId) -> Vec<&EventRecord> {
        self.by_team
            .get(&team)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Forgets every undo and redo step. Events stay as they are.
    pub fn clear_history(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Steps available to undo.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Steps available to redo.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    fn stamp(&mut self, period: MatchPeriod, elapsed_secs: u32, draft: EventDraft) -> EventRecord {
        let id = self.next_event_id;
        self.next_event_id += 1;
        EventRecord {
            id,
            payload: draft.payload,
            period,
            elapsed_secs,
            team: draft.team,
            player: draft.player,
            annotation: draft.annotation,
        }
    }

    fn push_undo(&mut self, inverse: Op) {
        self.undo.push(inverse);
        self.redo.clear();
    }

    fn apply_op(&mut self, op: Op) -> Result<Op, MatchError> {
        match op {
            Op::Insert { event } => self.apply_insert(event),
            Op::Restore { event } => self.apply_restore(event),
            Op::Remove { id } => self.apply_remove(id),
        }
    }

    fn apply_insert(&mut self, event: EventRecord) -> Result<Op, MatchError> {
        let id = event.id;
        if self.records.contains_key(&id) {
            return Err(MatchError::AlreadyExists(id));
        }

        self.next_event_id = self.next_event_id.max(id.saturating_add(1));
        if let Some(team) = event.team {
            Self::insert_sorted(self.by_team.entry(team).or_default(), id);
        }
        Self::insert_sorted(&mut self.order, id);
        self.records.insert(id, event);
        Ok(Op::Remove { id })
    }

    fn apply_restore(&mut self, event: EventRecord) -> Result<Op, MatchError> {
        let id = event.id;
        let rec = self.records.get_mut(&id).ok_or(MatchError::NotFound(id))?;
        let old = std::mem::replace(rec, event);
        let new_team = rec.team;

        if old.team != new_team {
            if let Some(team) = old.team {
                self.unindex_team(team, id);
            }
            if let Some(team) = new_team {
                Self::insert_sorted(self.by_team.entry(team).or_default(), id);
            }
        }
        Ok(Op::Restore { event: old })
    }

    fn apply_remove(&mut self, id: EventId) -> Result<Op, MatchError> {
        let event = self.records.remove(&id).ok_or(MatchError::NotFound(id))?;
        Self::remove_from_vec_index(&mut self.order, id);
        if let Some(team) = event.team {
            self.unindex_team(team, id);
        }
        Ok(Op::Insert { event })
    }

    fn unindex_team(&mut self, team: TeamId, id: EventId) {
        if let Some(ids) = self.by_team.get_mut(&team) {
            Self::remove_from_vec_index(ids, id);
            if ids.is_empty() {
                self.by_team.remove(&team);
            }
        }
    }

    fn insert_sorted(v: &mut Vec<EventId>, id: EventId) {
        if let Err(pos) = v.binary_search(&id) {
            v.insert(pos, id);
        }
    }

    fn remove_from_vec_index(v: &mut Vec<EventId>, id: EventId) {
        if let Ok(pos) = v.binary_search(&id) {
            v.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CardType, ShotOutcome};

    #[test]
    fn ties_keep_insertion_order_and_reverse_exactly() {
        let mut log = EventLog::new();
        let a = log
            .insert(MatchPeriod::FirstHalf, 100, EventDraft::shot(1, ShotOutcome::Point))
            .unwrap();
        let b = log
            .insert(MatchPeriod::FirstHalf, 50, EventDraft::shot(2, ShotOutcome::Wide))
            .unwrap();
        let c = log
            .insert(MatchPeriod::FirstHalf, 100, EventDraft::shot(2, ShotOutcome::Goal))
            .unwrap();

        let chrono: Vec<EventId> = log.chronological().map(|e| e.id).collect();
        assert_eq!(chrono, vec![b, a, c]);
        let recent: Vec<EventId> = log.recent_first().map(|e| e.id).collect();
        assert_eq!(recent, vec![c, a, b]);
    }

    #[test]
    fn undo_of_delete_restores_tie_break_position() {
        let mut log = EventLog::new();
        let a = log
            .insert(MatchPeriod::SecondHalf, 10, EventDraft::shot(1, ShotOutcome::Point))
            .unwrap();
        let b = log
            .insert(MatchPeriod::SecondHalf, 10, EventDraft::shot(1, ShotOutcome::Goal))
            .unwrap();
        let before: Vec<EventId> = log.chronological().map(|e| e.id).collect();

        log.delete(a).unwrap();
        assert_eq!(log.by_team(1).len(), 1);
        log.undo().unwrap();

        let after: Vec<EventId> = log.chronological().map(|e| e.id).collect();
        assert_eq!(after, before);
        assert_eq!(after, vec![a, b]);
        assert_eq!(log.by_team(1).len(), 2);
    }

    #[test]
    fn clock_events_are_locked() {
        let mut log = EventLog::new();
        let start = log
            .append_clock_event(EventKind::PeriodStart, MatchPeriod::FirstHalf, 0)
            .unwrap();
        assert_eq!(log.undo_len(), 0);
        assert_eq!(log.delete(start), Err(MatchError::ClockEventLocked(start)));
        let patch = EventPatch {
            annotation: Some(Some("throw-in".to_string())),
            ..EventPatch::default()
        };
        assert_eq!(log.edit(start, &patch), Err(MatchError::ClockEventLocked(start)));
    }

    #[test]
    fn edit_moves_team_index() {
        let mut log = EventLog::new();
        let id = log
            .insert(
                MatchPeriod::FirstHalf,
                30,
                EventDraft::new(EventPayload::Card {
                    card: CardType::Yellow,
                })
                .for_team(1),
            )
            .unwrap();
        let patch = EventPatch {
            team: Some(2),
            card: Some(CardType::Black),
            ..EventPatch::default()
        };
        log.edit(id, &patch).unwrap();
        assert!(log.by_team(1).is_empty());
        assert_eq!(log.by_team(2)[0].payload, EventPayload::Card { card: CardType::Black });

        log.undo().unwrap();
        assert_eq!(log.by_team(1).len(), 1);
        assert!(log.by_team(2).is_empty());
        assert!(!log.by_team.contains_key(&2));
    }

    #[test]
    fn emptied_team_lists_are_dropped() {
        let mut log = EventLog::new();
        let id = log
            .insert(MatchPeriod::FirstHalf, 5, EventDraft::shot(7, ShotOutcome::Point))
            .unwrap();
        log.delete(id).unwrap();
        assert!(!log.by_team.contains_key(&7));

        log.undo().unwrap();
        assert_eq!(log.by_team[&7], vec![id]);
        log.redo().unwrap();
        assert!(log.by_team.is_empty());
    }
}

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::{MatchConfig, MatchInfo},
    engine::score::{ScoreLine, score},
    event::{EventDraft, EventPatch, EventRecord},
    types::{EventId, MatchId, MatchPeriod, TeamId},
};

use super::{
    clock::{MatchClock, PeriodTransition, now_ms},
    error::{Action, MatchError},
    log::{Chronological, EventLog, EventLogSnapshotV1, RecentFirst},
};

/// Persistable form of a [`Match`]. Undo history is not carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshotV1 {
    /// Match identifier.
    pub id: MatchId,
    /// Descriptive metadata and sides.
    pub info: MatchInfo,
    /// Rules in force.
    pub config: MatchConfig,
    /// Clock state, elapsed time refreshed.
    pub clock: MatchClock,
    /// Event log contents.
    pub events: EventLogSnapshotV1,
}

/// Aggregate root: clock, event log, sides, and configuration of one match.
///
/// Every clock and log mutation goes through here so the two never drift
/// apart. Methods ending in `_at` take the wall clock explicitly; the others
/// read [`now_ms`].
#[derive(Debug)]
pub struct Match {
    id: MatchId,
    info: MatchInfo,
    config: MatchConfig,
    clock: MatchClock,
    log: EventLog,
}

impl Match {
    /// Creates a match that has not started.
    pub fn new(id: MatchId, info: MatchInfo, config: MatchConfig) -> Self {
        Self {
            id,
            info,
            config,
            clock: MatchClock::new(),
            log: EventLog::new(),
        }
    }

    /// Rebuilds a match from a stored snapshot.
    pub fn from_snapshot(snapshot: MatchSnapshotV1) -> Result<Self, MatchError> {
        Ok(Self {
            id: snapshot.id,
            info: snapshot.info,
            config: snapshot.config,
            clock: snapshot.clock,
            log: EventLog::from_snapshot(snapshot.events)?,
        })
    }

    /// [`Match::export_snapshot_at`] using the wall clock.
    pub fn export_snapshot(&mut self) -> MatchSnapshotV1 {
        self.export_snapshot_at(now_ms())
    }

    /// Refreshes the cached elapsed time, then captures the whole aggregate.
    pub fn export_snapshot_at(&mut self, now_ms: u64) -> MatchSnapshotV1 {
        self.clock.refresh(now_ms);
        MatchSnapshotV1 {
            id: self.id,
            info: self.info.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            events: self.log.export_snapshot(),
        }
    }

    /// Match identifier.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Descriptive metadata.
    pub fn info(&self) -> &MatchInfo {
        &self.info
    }

    /// Mutable metadata for the settings screen.
    pub fn info_mut(&mut self) -> &mut MatchInfo {
        &mut self.info
    }

    /// Rules in force.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Clock state.
    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    /// Event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Current period.
    pub fn period(&self) -> MatchPeriod {
        self.clock.period()
    }

    /// True when the clock is stopped.
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Elapsed seconds in the current period, now.
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs_at(now_ms())
    }

    /// Elapsed seconds in the current period as of `now_ms`.
    pub fn elapsed_secs_at(&self, now_ms: u64) -> u32 {
        self.clock.elapsed_secs_at(now_ms)
    }

    /// [`Match::added_time_secs_at`] using the wall clock.
    pub fn added_time_secs(&self) -> u32 {
        self.added_time_secs_at(now_ms())
    }

    /// Seconds played beyond regulation in the current period.
    pub fn added_time_secs_at(&self, now_ms: u64) -> u32 {
        self.config
            .period_length_secs(self.period())
            .map(|len| self.elapsed_secs_at(now_ms).saturating_sub(len))
            .unwrap_or(0)
    }

    /// Switches extra time on or off. Only allowed until normal time ends.
    pub fn set_extra_time(&mut self, half_secs: Option<u32>) -> Result<(), MatchError> {
        if self.period() > MatchPeriod::SecondHalf {
            return Err(MatchError::InvalidTransition {
                action: Action::ConfigureExtraTime,
                period: self.period(),
            });
        }
        self.config.extra_time_half_secs = half_secs;
        Ok(())
    }

    /// [`Match::start_period_at`] using the wall clock.
    pub fn start_period(&mut self) -> Result<EventId, MatchError> {
        self.start_period_at(now_ms())
    }

    /// Starts the next play period and logs its `PeriodStart` event.
    pub fn start_period_at(&mut self, now_ms: u64) -> Result<EventId, MatchError> {
        let transition = self
            .clock
            .start_period(now_ms, &self.config)
            .inspect_err(|err| warn!(match_id = self.id, %err, "start period rejected"))?;
        self.log_transition(transition)
    }

    /// [`Match::end_period_at`] using the wall clock.
    pub fn end_period(&mut self) -> Result<EventId, MatchError> {
        self.end_period_at(now_ms())
    }

    /// Ends the running period and logs its `PeriodEnd` event.
    pub fn end_period_at(&mut self, now_ms: u64) -> Result<EventId, MatchError> {
        let transition = self
            .clock
            .end_period(now_ms, &self.config)
            .inspect_err(|err| warn!(match_id = self.id, %err, "end period rejected"))?;
        self.log_transition(transition)
    }

    /// [`Match::pause_at`] using the wall clock.
    pub fn pause(&mut self) -> Result<bool, MatchError> {
        self.pause_at(now_ms())
    }

    /// Stops the clock. `Ok(false)` when already paused.
    pub fn pause_at(&mut self, now_ms: u64) -> Result<bool, MatchError> {
        self.clock.pause(now_ms)
    }

    /// [`Match::resume_at`] using the wall clock.
    pub fn resume(&mut self) -> Result<bool, MatchError> {
        self.resume_at(now_ms())
    }

    /// Restarts the clock. `Ok(false)` when not paused.
    pub fn resume_at(&mut self, now_ms: u64) -> Result<bool, MatchError> {
        self.clock.resume(now_ms)
    }

    /// [`Match::suspend_at`] using the wall clock.
    pub fn suspend(&mut self) -> bool {
        self.suspend_at(now_ms())
    }

    /// Host is about to stop running; see [`MatchClock::suspend`].
    pub fn suspend_at(&mut self, now_ms: u64) -> bool {
        self.clock.suspend(now_ms)
    }

    /// [`Match::reconcile_at`] using the wall clock.
    pub fn reconcile(&mut self) -> bool {
        self.reconcile_at(now_ms())
    }

    /// Host is running again; see [`MatchClock::reconcile`].
    pub fn reconcile_at(&mut self, now_ms: u64) -> bool {
        self.clock.reconcile(now_ms)
    }

    /// Abandons timing and returns to `NotStarted`.
    ///
    /// Recorded events are kept but the undo and redo history is dropped, so
    /// a fresh start cannot undo into the abandoned attempt.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.log.clear_history();
    }

    /// [`Match::record_at`] using the wall clock.
    pub fn record(&mut self, draft: EventDraft) -> Result<EventId, MatchError> {
        self.record_at(draft, now_ms())
    }

    /// Records `draft` at the current period and elapsed time.
    ///
    /// Requires a running play period; a paused one is fine.
    pub fn record_at(&mut self, draft: EventDraft, now_ms: u64) -> Result<EventId, MatchError> {
        if !self.clock.is_running() {
            return Err(MatchError::InvalidTransition {
                action: Action::Record,
                period: self.period(),
            });
        }
        if draft.payload.kind().is_clock_generated() {
            return Err(MatchError::InvalidTransition {
                action: Action::Record,
                period: self.period(),
            });
        }
        if let Some(detail) = draft.payload.unsupported_by(self.config.variant) {
            return Err(MatchError::UnsupportedOutcome {
                variant: self.config.variant,
                detail,
            });
        }
        self.check_team(draft.team)?;

        let elapsed = self.clock.refresh(now_ms);
        self.log.insert(self.clock.period(), elapsed, draft)
    }

    /// Edits payload fields of event `id`.
    pub fn edit(&mut self, id: EventId, patch: &EventPatch) -> Result<(), MatchError> {
        let current = self.log.get(id).ok_or(MatchError::NotFound(id))?;
        if current.kind().is_clock_generated() {
            return Err(MatchError::ClockEventLocked(id));
        }
        let mut preview = current.clone();
        patch
            .check_kind(current)
            .map_err(|m| MatchError::kind_mismatch(id, m))?;
        patch.apply_to(&mut preview);
        if let Some(detail) = preview.payload.unsupported_by(self.config.variant) {
            return Err(MatchError::UnsupportedOutcome {
                variant: self.config.variant,
                detail,
            });
        }
        self.check_team(patch.team)?;
        self.log.edit(id, patch)
    }

    /// Deletes a recorded event, returning it.
    pub fn delete(&mut self, id: EventId) -> Result<EventRecord, MatchError> {
        self.log.delete(id)
    }

    /// Reverts the latest record, edit, or delete.
    pub fn undo(&mut self) -> Result<EventId, MatchError> {
        self.log.undo()
    }

    /// Reapplies the latest undone change.
    pub fn redo(&mut self) -> Result<EventId, MatchError> {
        self.log.redo()
    }

    /// Events in match-time order.
    pub fn chronological(&self) -> Chronological<'_> {
        self.log.chronological()
    }

    /// Events newest first; exact reverse of [`Match::chronological`].
    pub fn recent_first(&self) -> RecentFirst<'_> {
        self.log.recent_first()
    }

    /// Current score of `team`.
    pub fn score(&self, team: TeamId) -> ScoreLine {
        score(&self.log, team, None)
    }

    /// Score of `team` as of event `cutoff` in match time.
    pub fn score_as_of(&self, team: TeamId, cutoff: EventId) -> Result<ScoreLine, MatchError> {
        let cutoff = self.log.get(cutoff).ok_or(MatchError::NotFound(cutoff))?;
        Ok(score(&self.log, team, Some(cutoff)))
    }

    fn check_team(&self, team: Option<TeamId>) -> Result<(), MatchError> {
        match team {
            Some(t) if !self.info.is_side(t) => Err(MatchError::UnknownTeam(t)),
            _ => Ok(()),
        }
    }

    fn log_transition(&mut self, t: PeriodTransition) -> Result<EventId, MatchError> {
        self.log.append_clock_event(t.kind, t.period, t.elapsed_secs)
    }
}

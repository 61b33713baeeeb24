//! Timestamp-based match clock.
//!
//! Elapsed time is never accumulated per tick. While a period runs it is
//! derived from absolute timestamps as
//! `now - period_started_at - paused_total`, so redisplay timers may be
//! skipped, delayed, or duplicated without affecting it. Callers pass `now`
//! in milliseconds since epoch; [`now_ms`] supplies the wall clock.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{config::MatchConfig, event::EventKind, types::MatchPeriod};

use super::error::{Action, MatchError};

/// Boundary event a period transition must append to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTransition {
    /// `PeriodStart` or `PeriodEnd`.
    pub kind: EventKind,
    /// Period being started or ended.
    pub period: MatchPeriod,
    /// Elapsed time to stamp on the boundary event.
    pub elapsed_secs: u32,
}

/// Period state machine with timestamp-derived elapsed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchClock {
    period: MatchPeriod,
    /// Snapshot of elapsed play; authoritative only when frozen.
    elapsed_secs: u32,
    is_paused: bool,
    period_started_at_ms: Option<u64>,
    /// Start of the current pause, or the suspend bookmark when not paused.
    last_paused_at_ms: Option<u64>,
    paused_total_ms: u64,
}

impl Default for MatchClock {
    fn default() -> Self {
        Self {
            period: MatchPeriod::NotStarted,
            elapsed_secs: 0,
            is_paused: true,
            period_started_at_ms: None,
            last_paused_at_ms: None,
            paused_total_ms: 0,
        }
    }
}

impl MatchClock {
    /// Clock before the throw-in, paused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current period.
    pub fn period(&self) -> MatchPeriod {
        self.period
    }

    /// True when play is stopped.
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// True while a play period has been started and not yet ended.
    pub fn is_running(&self) -> bool {
        self.period_started_at_ms.is_some()
    }

    /// True between `suspend` and `reconcile` of an unpaused running clock.
    pub fn is_suspended(&self) -> bool {
        !self.is_paused && self.last_paused_at_ms.is_some()
    }

    /// Wall-clock start of the running period.
    pub fn period_started_at_ms(&self) -> Option<u64> {
        self.period_started_at_ms
    }

    /// Start of the current pause or pending suspend bookmark.
    pub fn last_paused_at_ms(&self) -> Option<u64> {
        self.last_paused_at_ms
    }

    /// Stoppage accumulated in the running period.
    pub fn paused_total_ms(&self) -> u64 {
        self.paused_total_ms
    }

    /// Elapsed seconds in the current period as of `now_ms`.
    pub fn elapsed_secs_at(&self, now_ms: u64) -> u32 {
        match self.period_started_at_ms {
            Some(started) if !self.is_paused => {
                // A suspend bookmark stops the clock until reconcile folds it in.
                let until = self.last_paused_at_ms.unwrap_or(now_ms);
                played_secs(until, started, self.paused_total_ms)
            }
            _ => self.elapsed_secs,
        }
    }

    /// Refreshes the cached elapsed snapshot from the timestamps.
    pub fn refresh(&mut self, now_ms: u64) -> u32 {
        self.elapsed_secs = self.elapsed_secs_at(now_ms);
        self.elapsed_secs
    }

    /// Starts the next play period.
    pub fn start_period(
        &mut self,
        now_ms: u64,
        config: &MatchConfig,
    ) -> Result<PeriodTransition, MatchError> {
        let next = if self.is_running() {
            None
        } else {
            config.next_play_period(self.period)
        };
        let Some(next) = next else {
            return Err(MatchError::InvalidTransition {
                action: Action::StartPeriod,
                period: self.period,
            });
        };

        self.period = next;
        self.elapsed_secs = 0;
        self.paused_total_ms = 0;
        self.last_paused_at_ms = None;
        self.period_started_at_ms = Some(now_ms);
        self.is_paused = false;
        info!(period = ?next, "period started");

        Ok(PeriodTransition {
            kind: EventKind::PeriodStart,
            period: next,
            elapsed_secs: 0,
        })
    }

    /// Ends the running period, freezing its elapsed time.
    pub fn end_period(
        &mut self,
        now_ms: u64,
        config: &MatchConfig,
    ) -> Result<PeriodTransition, MatchError> {
        let Some(started) = self.period_started_at_ms else {
            return Err(MatchError::InvalidTransition {
                action: Action::EndPeriod,
                period: self.period,
            });
        };

        let until = self.last_paused_at_ms.unwrap_or(now_ms);
        let elapsed_secs = played_secs(until, started, self.paused_total_ms);
        let ended = self.period;

        self.elapsed_secs = elapsed_secs;
        self.period_started_at_ms = None;
        self.last_paused_at_ms = None;
        self.is_paused = true;
        self.period = config.next_period(ended).unwrap_or(MatchPeriod::MatchOver);
        info!(period = ?ended, elapsed_secs, next = ?self.period, "period ended");

        Ok(PeriodTransition {
            kind: EventKind::PeriodEnd,
            period: ended,
            elapsed_secs,
        })
    }

    /// Stops the clock. Returns `false` when it was already paused.
    pub fn pause(&mut self, now_ms: u64) -> Result<bool, MatchError> {
        if self.is_paused {
            return Ok(false);
        }
        if !self.is_running() {
            return Err(MatchError::InvalidTransition {
                action: Action::Pause,
                period: self.period,
            });
        }

        // Time away since a suspend bookmark counts as paused too.
        let since = *self.last_paused_at_ms.get_or_insert(now_ms);
        self.elapsed_secs = self.elapsed_secs_at(since);
        self.is_paused = true;
        debug!(elapsed_secs = self.elapsed_secs, "clock paused");
        Ok(true)
    }

    /// Restarts a paused clock. Returns `false` when it was not paused.
    pub fn resume(&mut self, now_ms: u64) -> Result<bool, MatchError> {
        if !self.is_paused {
            return Ok(false);
        }
        if !self.is_running() {
            return Err(MatchError::InvalidTransition {
                action: Action::Resume,
                period: self.period,
            });
        }

        if let Some(paused_at) = self.last_paused_at_ms.take() {
            self.paused_total_ms += now_ms.saturating_sub(paused_at);
        }
        self.is_paused = false;
        debug!(paused_total_ms = self.paused_total_ms, "clock resumed");
        Ok(true)
    }

    /// Bookmarks the moment the host stops running, without flipping the
    /// visible pause flag. Returns `true` when a bookmark was taken.
    pub fn suspend(&mut self, now_ms: u64) -> bool {
        if !self.is_running() || self.is_paused || self.last_paused_at_ms.is_some() {
            return false;
        }
        self.last_paused_at_ms = Some(now_ms);
        debug!(now_ms, "clock suspended");
        true
    }

    /// Folds time spent suspended into the paused total so it never counts
    /// as play. Returns `true` when a bookmark was folded.
    pub fn reconcile(&mut self, now_ms: u64) -> bool {
        if self.is_paused {
            return false;
        }
        let Some(suspended_at) = self.last_paused_at_ms.take() else {
            return false;
        };
        let away_ms = now_ms.saturating_sub(suspended_at);
        self.paused_total_ms += away_ms;
        debug!(away_ms, "clock reconciled");
        true
    }

    /// Returns the clock to `NotStarted`, discarding all timing state.
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("clock reset");
    }
}

fn played_secs(until_ms: u64, started_ms: u64, paused_ms: u64) -> u32 {
    let played_ms = until_ms.saturating_sub(started_ms).saturating_sub(paused_ms);
    u32::try_from(played_ms / 1000).unwrap_or(u32::MAX)
}

/// Wall-clock milliseconds since epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

//! Score derivation over the event log. Stateless; recomputed on every call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    core::log::EventLog,
    event::{EventKind, EventRecord, ShotOutcome},
    types::TeamId,
};

/// Score tuple in goals-points notation.
///
/// `points` is the value of all non-goal scores, so a two-pointer adds 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    /// Goals scored.
    pub goals: u32,
    /// Value of all non-goal scores.
    pub points: u32,
    /// Goals times three plus points.
    pub total: u32,
}

impl ScoreLine {
    /// Score line with total derived.
    pub fn new(goals: u32, points: u32) -> Self {
        Self {
            goals,
            points,
            total: goals * 3 + points,
        }
    }

    /// Adds a scoring shot. Misses leave the line unchanged.
    pub fn add(&mut self, outcome: ShotOutcome) {
        match outcome {
            ShotOutcome::Goal => self.goals += 1,
            other => self.points += other.points(),
        }
        self.total += outcome.points();
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02} ({})", self.goals, self.points, self.total)
    }
}

/// Score of `team`, optionally counting only events at or before `cutoff`
/// in match time.
pub fn score(log: &EventLog, team: TeamId, cutoff: Option<&EventRecord>) -> ScoreLine {
    tally(log.iter(), team, cutoff)
}

/// [`score`] over any event sequence.
pub fn tally<'a>(
    events: impl IntoIterator<Item = &'a EventRecord>,
    team: TeamId,
    cutoff: Option<&EventRecord>,
) -> ScoreLine {
    let mut line = ScoreLine::default();
    for event in events {
        if event.team != Some(team) {
            continue;
        }
        if cutoff.is_some_and(|c| !event.is_at_or_before(c)) {
            continue;
        }
        if let Some(outcome) = event.payload.shot_outcome() {
            line.add(outcome);
        }
    }
    line
}

/// Both sides' score as of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningScore<'a> {
    /// Milestone event.
    pub event: &'a EventRecord,
    /// Home score as of `event`.
    pub home: ScoreLine,
    /// Away score as of `event`.
    pub away: ScoreLine,
}

/// Running score beside every scoring shot and period boundary, newest first.
pub fn running_scores(log: &EventLog, home: TeamId, away: TeamId) -> Vec<RunningScore<'_>> {
    log.recent_first()
        .filter(|e| is_milestone(e))
        .map(|event| RunningScore {
            event,
            home: score(log, home, Some(event)),
            away: score(log, away, Some(event)),
        })
        .collect()
}

fn is_milestone(event: &EventRecord) -> bool {
    match event.kind() {
        EventKind::PeriodStart | EventKind::PeriodEnd => true,
        _ => event.payload.shot_outcome().is_some_and(ShotOutcome::is_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::EventDraft, types::MatchPeriod};

    #[test]
    fn display_pads_points() {
        assert_eq!(ScoreLine::new(2, 5).to_string(), "2-05 (11)");
        assert_eq!(ScoreLine::new(0, 14).to_string(), "0-14 (14)");
    }

    #[test]
    fn misses_do_not_score() {
        let mut line = ScoreLine::default();
        line.add(ShotOutcome::Wide);
        line.add(ShotOutcome::OffPost);
        assert_eq!(line, ScoreLine::default());
        line.add(ShotOutcome::TwoPointer);
        assert_eq!(line, ScoreLine::new(0, 2));
    }

    #[test]
    fn cutoff_includes_later_inserted_ties() {
        let mut log = EventLog::new();
        let first = log
            .insert(MatchPeriod::FirstHalf, 200, EventDraft::shot(1, ShotOutcome::Point))
            .unwrap();
        log.insert(MatchPeriod::FirstHalf, 200, EventDraft::shot(1, ShotOutcome::Goal))
            .unwrap();
        log.insert(MatchPeriod::SecondHalf, 10, EventDraft::shot(1, ShotOutcome::Point))
            .unwrap();

        let cutoff = log.get(first).unwrap();
        assert_eq!(score(&log, 1, Some(cutoff)), ScoreLine::new(1, 1));
        assert_eq!(score(&log, 1, None), ScoreLine::new(1, 2));
        assert_eq!(score(&log, 2, None), ScoreLine::default());
    }
}

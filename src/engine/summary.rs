//! Per-team match statistics derived from the event log.

use std::cmp::Ordering;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    core::aggregate::Match,
    event::{CardType, EventPayload, EventRecord, FoulOutcome, ShotOutcome},
    types::{MatchPeriod, PlayerId, TeamId},
};

use super::score::ScoreLine;

/// Scoring tally for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerLine {
    /// Scoring player.
    pub player: PlayerId,
    /// Player's scores.
    pub score: ScoreLine,
}

/// Statistics for one side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamSummary {
    /// Side summarized.
    pub team: TeamId,
    /// Current score.
    pub score: ScoreLine,
    /// Every shot, scored or not.
    pub shots: u32,
    /// Shots wide.
    pub wides: u32,
    /// Shots saved.
    pub saved: u32,
    /// Shots dropped short.
    pub dropped_short: u32,
    /// Shots off the post.
    pub off_post: u32,
    /// Frees given away.
    pub frees_conceded: u32,
    /// Penalties given away.
    pub penalties_conceded: u32,
    /// Yellow cards.
    pub yellow_cards: u32,
    /// Red cards.
    pub red_cards: u32,
    /// Black cards.
    pub black_cards: u32,
    /// Own kickouts kept.
    pub kickouts_won: u32,
    /// Own kickouts lost.
    pub kickouts_lost: u32,
    /// Substitutions made.
    pub substitutions: u32,
    /// Highest total first, then by player id.
    pub scorers: Vec<ScorerLine>,
}

impl TeamSummary {
    fn new(team: TeamId) -> Self {
        Self {
            team,
            ..Self::default()
        }
    }

    fn add(&mut self, event: &EventRecord, scorers: &mut HashMap<PlayerId, ScoreLine>) {
        match &event.payload {
            EventPayload::Shot { outcome, .. } => {
                self.shots += 1;
                self.score.add(*outcome);
                match outcome {
                    ShotOutcome::Wide => self.wides += 1,
                    ShotOutcome::Saved => self.saved += 1,
                    ShotOutcome::DroppedShort => self.dropped_short += 1,
                    ShotOutcome::OffPost => self.off_post += 1,
                    _ => {
                        if let Some(player) = event.player {
                            scorers.entry(player).or_default().add(*outcome);
                        }
                    }
                }
            }
            EventPayload::FoulConceded { outcome } => match outcome {
                FoulOutcome::Free => self.frees_conceded += 1,
                FoulOutcome::Penalty => self.penalties_conceded += 1,
            },
            EventPayload::Card { card } => match card {
                CardType::Yellow => self.yellow_cards += 1,
                CardType::Red => self.red_cards += 1,
                CardType::Black => self.black_cards += 1,
            },
            EventPayload::Kickout { won_own: true } => self.kickouts_won += 1,
            EventPayload::Kickout { won_own: false } => self.kickouts_lost += 1,
            EventPayload::Substitution { .. } => self.substitutions += 1,
            EventPayload::PeriodStart | EventPayload::PeriodEnd | EventPayload::Note { .. } => {}
        }
    }
}

/// Both sides' statistics at a point in the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Period when summarized.
    pub period: MatchPeriod,
    /// Home side.
    pub home: TeamSummary,
    /// Away side.
    pub away: TeamSummary,
}

impl MatchSummary {
    /// Side ahead on total, or `None` when level.
    pub fn leader(&self) -> Option<TeamId> {
        match self.home.score.total.cmp(&self.away.score.total) {
            Ordering::Greater => Some(self.home.team),
            Ordering::Less => Some(self.away.team),
            Ordering::Equal => None,
        }
    }

    /// Points between the sides.
    pub fn margin(&self) -> u32 {
        self.home.score.total.abs_diff(self.away.score.total)
    }
}

/// Derives both sides' statistics from the whole log.
pub fn summarize(m: &Match) -> MatchSummary {
    let home_id = m.info().home.id;
    let away_id = m.info().away.id;
    MatchSummary {
        period: m.period(),
        home: summarize_team(m.log().by_team(home_id), home_id),
        away: summarize_team(m.log().by_team(away_id), away_id),
    }
}

fn summarize_team(events: Vec<&EventRecord>, team: TeamId) -> TeamSummary {
    let mut summary = TeamSummary::new(team);
    let mut scorers: HashMap<PlayerId, ScoreLine> = HashMap::new();
    for event in events {
        summary.add(event, &mut scorers);
    }

    summary.scorers = scorers
        .into_iter()
        .map(|(player, score)| ScorerLine { player, score })
        .collect();
    summary
        .scorers
        .sort_by(|a, b| b.score.total.cmp(&a.score.total).then(a.player.cmp(&b.player)));
    summary
}

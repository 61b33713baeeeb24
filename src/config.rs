//! Match configuration and descriptive metadata.

use serde::{Deserialize, Serialize};

use crate::{
    roster::Team,
    types::{MatchPeriod, SportVariant, TeamId},
};

/// Standard half length for adult championship games.
pub const DEFAULT_HALF_LENGTH_SECS: u32 = 1800;

/// Rules fixed when the match is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Code being played.
    pub variant: SportVariant,
    /// Regulation length of each half of normal time.
    pub half_length_secs: u32,
    /// Length of each extra-time half. `None` means no extra time is played.
    #[serde(default)]
    pub extra_time_half_secs: Option<u32>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            variant: SportVariant::default(),
            half_length_secs: DEFAULT_HALF_LENGTH_SECS,
            extra_time_half_secs: None,
        }
    }
}

impl MatchConfig {
    /// Period that follows `period` for this configuration.
    ///
    /// Without extra time the match ends when the second half does.
    pub fn next_period(&self, period: MatchPeriod) -> Option<MatchPeriod> {
        match period {
            MatchPeriod::SecondHalf if self.extra_time_half_secs.is_none() => {
                Some(MatchPeriod::MatchOver)
            }
            other => other.next(),
        }
    }

    /// Play period a clock sitting at `period` may start next, if any.
    pub fn next_play_period(&self, period: MatchPeriod) -> Option<MatchPeriod> {
        self.next_period(period).filter(|p| p.is_play_period())
    }

    /// Regulation length of a play period; `None` for breaks.
    pub fn period_length_secs(&self, period: MatchPeriod) -> Option<u32> {
        match period {
            MatchPeriod::FirstHalf | MatchPeriod::SecondHalf => Some(self.half_length_secs),
            MatchPeriod::ExtraTimeFirstHalf | MatchPeriod::ExtraTimeSecondHalf => {
                self.extra_time_half_secs
            }
            _ => None,
        }
    }
}

/// Descriptive match data. Edited by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    /// Competition name, e.g. "Connacht Championship".
    pub competition: String,
    /// Ground the match is played at.
    pub venue: String,
    /// Referee's name.
    pub referee: String,
    /// Throw-in date in milliseconds since epoch.
    pub date_ms: u64,
    /// Home side.
    pub home: Team,
    /// Away side.
    pub away: Team,
}

impl MatchInfo {
    /// Metadata with empty descriptive fields.
    pub fn new(home: Team, away: Team, date_ms: u64) -> Self {
        Self {
            competition: String::new(),
            venue: String::new(),
            referee: String::new(),
            date_ms,
            home,
            away,
        }
    }

    /// True when `team` is one of the two sides.
    pub fn is_side(&self, team: TeamId) -> bool {
        self.home.id == team || self.away.id == team
    }

    /// Side with id `team`, if playing.
    pub fn team(&self, team: TeamId) -> Option<&Team> {
        [&self.home, &self.away].into_iter().find(|t| t.id == team)
    }
}

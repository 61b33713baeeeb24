//! Shared primitive IDs, match periods, and sport variants.

use serde::{Deserialize, Serialize};

/// Persistent match identifier.
pub type MatchId = u64;
/// Monotonic event identifier, never reused within a match.
pub type EventId = u64;
/// Opaque team handle supplied by the roster collaborator.
pub type TeamId = u64;
/// Opaque player handle supplied by the roster collaborator.
pub type PlayerId = u64;

/// One segment of match time, in canonical sequence order.
///
/// The derived `Ord` follows declaration order, so comparing two periods
/// compares their position in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchPeriod {
    /// Before the throw-in.
    NotStarted,
    /// First half of normal time.
    FirstHalf,
    /// Half-time break.
    HalfTime,
    /// Second half of normal time.
    SecondHalf,
    /// End of normal time.
    FullTime,
    /// First half of extra time.
    ExtraTimeFirstHalf,
    /// Extra-time interval.
    ExtraTimeHalfTime,
    /// Second half of extra time.
    ExtraTimeSecondHalf,
    /// Final whistle.
    MatchOver,
}

impl MatchPeriod {
    /// Every period in canonical order.
    pub const ALL: [MatchPeriod; 9] = [
        MatchPeriod::NotStarted,
        MatchPeriod::FirstHalf,
        MatchPeriod::HalfTime,
        MatchPeriod::SecondHalf,
        MatchPeriod::FullTime,
        MatchPeriod::ExtraTimeFirstHalf,
        MatchPeriod::ExtraTimeHalfTime,
        MatchPeriod::ExtraTimeSecondHalf,
        MatchPeriod::MatchOver,
    ];

    /// Position in the canonical sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following period in the canonical sequence, if any.
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// True for the four periods in which play happens.
    pub fn is_play_period(self) -> bool {
        matches!(
            self,
            Self::FirstHalf | Self::SecondHalf | Self::ExtraTimeFirstHalf | Self::ExtraTimeSecondHalf
        )
    }

    /// True for intervals between play periods.
    pub fn is_break(self) -> bool {
        matches!(self, Self::HalfTime | Self::FullTime | Self::ExtraTimeHalfTime)
    }

    /// True once normal time or the whole match has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::FullTime | Self::MatchOver)
    }

    /// True for the extra-time periods.
    pub fn is_extra_time(self) -> bool {
        matches!(
            self,
            Self::ExtraTimeFirstHalf | Self::ExtraTimeHalfTime | Self::ExtraTimeSecondHalf
        )
    }
}

/// Gaelic code being played. Selects which outcomes and shot types are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SportVariant {
    /// Men's Gaelic football.
    Football,
    /// Hurling.
    Hurling,
    /// Ladies' Gaelic football.
    #[default]
    LadiesFootball,
    /// Camogie.
    Camogie,
}

impl SportVariant {
    /// Two-point scores from outside the arc exist only in men's football.
    pub fn supports_two_pointer(self) -> bool {
        matches!(self, Self::Football)
    }

    /// Marks are awarded in the football codes only.
    pub fn supports_mark(self) -> bool {
        matches!(self, Self::Football | Self::LadiesFootball)
    }

    /// True for the stick codes, where the restart from the end line is a 65.
    pub fn is_stick_code(self) -> bool {
        matches!(self, Self::Hurling | Self::Camogie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_walks_every_period_once() {
        let mut seen = vec![MatchPeriod::NotStarted];
        let mut cur = MatchPeriod::NotStarted;
        while let Some(next) = cur.next() {
            assert!(next > cur);
            seen.push(next);
            cur = next;
        }
        assert_eq!(seen, MatchPeriod::ALL.to_vec());
        assert_eq!(MatchPeriod::MatchOver.next(), None);
    }

    #[test]
    fn predicates_partition_periods() {
        for p in MatchPeriod::ALL {
            assert!(!(p.is_play_period() && p.is_break()));
        }
        assert!(MatchPeriod::FullTime.is_break());
        assert!(MatchPeriod::FullTime.is_terminal());
        assert!(!MatchPeriod::NotStarted.is_play_period());
    }
}

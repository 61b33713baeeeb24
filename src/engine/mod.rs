//! Scores and statistics derived from the event log.

/// Score tuples, point-in-time scores, and running scores.
pub mod score;
/// Per-team match statistics.
pub mod summary;

//! Live match tracking for Gaelic games: a period clock, an editable event
//! log, and scores derived from it, with SQLite-backed match storage.
//!
//! # Examples
//!
//! In-memory usage with [`core::aggregate::Match`]:
//! ```
//! use matchlog::{
//!     config::{MatchConfig, MatchInfo},
//!     core::aggregate::Match,
//!     event::{EventDraft, ShotOutcome},
//!     roster::Team,
//!     types::{MatchPeriod, SportVariant},
//! };
//!
//! let info = MatchInfo::new(Team::new(1, "Home"), Team::new(2, "Away"), 0);
//! let config = MatchConfig { variant: SportVariant::Football, ..MatchConfig::default() };
//! let mut m = Match::new(7, info, config);
//!
//! m.start_period_at(0).expect("throw-in");
//! m.record_at(EventDraft::shot(1, ShotOutcome::Goal), 60_000).expect("goal");
//! m.record_at(EventDraft::shot(1, ShotOutcome::TwoPointer), 90_000).expect("two");
//! m.end_period_at(1_800_000).expect("half time");
//!
//! assert_eq!(m.period(), MatchPeriod::HalfTime);
//! assert_eq!(m.score(1).to_string(), "1-02 (5)");
//! ```
//!
//! Runtime usage with the SQLite repository:
//! ```no_run
//! use matchlog::{
//!     config::{MatchConfig, MatchInfo},
//!     core::aggregate::Match,
//!     event::{EventDraft, ShotOutcome},
//!     persist::sqlite::SqliteMatchRepository,
//!     roster::Team,
//!     runtime::handle::{RuntimeConfig, spawn_session},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let repo = SqliteMatchRepository::open("matches.db").expect("open sqlite");
//! let info = MatchInfo::new(Team::new(1, "Home"), Team::new(2, "Away"), 0);
//! let m = Match::new(1, info, MatchConfig::default());
//! let session = spawn_session(m, Some(Box::new(repo)), RuntimeConfig::default());
//! session.start_period().await.expect("start");
//! session.record(EventDraft::shot(2, ShotOutcome::Point)).await.expect("record");
//! session.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Match rules and descriptive metadata.
pub mod config;
/// Clock, event log, and match aggregate.
pub mod core;
/// Scores and summaries derived from the event log.
pub mod engine;
/// Event records, drafts, and patches.
pub mod event;
/// Undo/redo op model.
pub mod op;
/// Repository abstraction and SQLite implementation.
pub mod persist;
/// Team and player values.
pub mod roster;
/// Single-writer match session and change events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;

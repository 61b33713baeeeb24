use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast;

use matchlog::{
    config::{MatchConfig, MatchInfo},
    core::{
        aggregate::{Match, MatchSnapshotV1},
        error::MatchError,
    },
    event::{EventDraft, EventKind, ShotOutcome},
    persist::{
        MatchListing, MatchRepository, PersistError, PersistResult,
        sqlite::SqliteMatchRepository,
    },
    roster::Team,
    runtime::{
        events::SessionEvent,
        handle::{RuntimeConfig, RuntimeError, spawn_session},
    },
    types::{MatchId, MatchPeriod, SportVariant},
};

fn new_match(id: u64) -> Match {
    let info = MatchInfo::new(Team::new(1, "Cork"), Team::new(2, "Limerick"), 0);
    let config = MatchConfig {
        variant: SportVariant::Hurling,
        ..MatchConfig::default()
    };
    Match::new(id, info, config)
}

struct FailingRepository;

impl MatchRepository for FailingRepository {
    fn save(&mut self, _snapshot: &MatchSnapshotV1) -> PersistResult<()> {
        Err(PersistError::Message("disk full".to_string()))
    }

    fn delete(&mut self, _id: MatchId) -> PersistResult<bool> {
        Ok(false)
    }

    fn list(&self) -> PersistResult<Vec<MatchListing>> {
        Ok(Vec::new())
    }

    fn load(&self, _id: MatchId) -> PersistResult<Option<MatchSnapshotV1>> {
        Ok(None)
    }
}

async fn next_matching(
    sub: &mut broadcast::Receiver<SessionEvent>,
    want: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    loop {
        let evt = tokio::time::timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("event timeout")
            .expect("recv");
        if want(&evt) {
            return evt;
        }
    }
}

#[tokio::test]
async fn session_records_queries_and_emits_events_in_order() {
    let session = spawn_session(new_match(1), None, RuntimeConfig::default());
    let mut sub = session.subscribe();

    session.start_period().await.expect("start");
    let goal = session
        .record(EventDraft::shot(1, ShotOutcome::Goal))
        .await
        .expect("record");
    assert!(session.pause().await.expect("pause"));

    assert_eq!(
        sub.recv().await.expect("recv"),
        SessionEvent::PeriodStarted { period: MatchPeriod::FirstHalf }
    );
    assert_eq!(sub.recv().await.expect("recv"), SessionEvent::Recorded { id: goal });
    assert_eq!(sub.recv().await.expect("recv"), SessionEvent::Paused);

    let status = session.status().await.expect("status");
    assert_eq!(status.period, MatchPeriod::FirstHalf);
    assert!(status.is_paused);

    assert_eq!(session.score(1, None).await.expect("score").total, 3);
    assert_eq!(session.score(1, Some(goal)).await.expect("score").goals, 1);

    let newest = session.recent_first().await.expect("recent");
    assert_eq!(newest[0].id, goal);
    let oldest = session.chronological().await.expect("chronological");
    assert_eq!(oldest[0].kind(), EventKind::PeriodStart);

    session.delete(goal).await.expect("delete");
    let err = session.delete(goal).await.expect_err("second delete");
    assert!(matches!(err, RuntimeError::Match(MatchError::NotFound(id)) if id == goal));

    assert_eq!(session.undo().await.expect("undo"), goal);
    assert_eq!(session.summary().await.expect("summary").home.score.goals, 1);

    let err = session.save().await.expect_err("no repository");
    assert!(matches!(err, RuntimeError::Persist(_)));

    session.shutdown().await.expect("shutdown");
    assert!(matches!(
        session.status().await,
        Err(RuntimeError::ChannelClosed)
    ));
}

#[tokio::test]
async fn invalid_transitions_surface_as_match_errors() {
    let session = spawn_session(new_match(2), None, RuntimeConfig::default());

    let err = session
        .record(EventDraft::shot(1, ShotOutcome::Point))
        .await
        .expect_err("not started");
    assert!(matches!(
        err,
        RuntimeError::Match(MatchError::InvalidTransition { .. })
    ));
    assert!(session.chronological().await.expect("events").is_empty());

    session.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn autosave_reaches_sqlite_and_shutdown_flushes() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("session.db");
    let repo = SqliteMatchRepository::open(&db_path).expect("open sqlite");

    let cfg = RuntimeConfig {
        save_latency_ms: 0,
        ..RuntimeConfig::default()
    };
    let session = spawn_session(new_match(3), Some(Box::new(repo)), cfg);
    let mut sub = session.subscribe();

    session.start_period().await.expect("start");
    next_matching(&mut sub, |e| *e == SessionEvent::Saved).await;

    session
        .record(EventDraft::shot(2, ShotOutcome::Point))
        .await
        .expect("record");
    session.save().await.expect("save");
    session.shutdown().await.expect("shutdown");

    let repo = SqliteMatchRepository::open(&db_path).expect("reopen");
    let loaded = repo.load_match(3).expect("load").expect("present");
    assert_eq!(loaded.period(), MatchPeriod::FirstHalf);
    assert_eq!(loaded.score(2).points, 1);
}

#[tokio::test]
async fn failed_saves_are_reported_and_state_survives() {
    let session = spawn_session(
        new_match(4),
        Some(Box::new(FailingRepository)),
        RuntimeConfig::default(),
    );
    let mut sub = session.subscribe();

    session.start_period().await.expect("start");
    let err = session.save().await.expect_err("save fails");
    assert!(matches!(err, RuntimeError::Persist(PersistError::Message(_))));

    let failed = next_matching(&mut sub, |e| matches!(e, SessionEvent::SaveFailed { .. })).await;
    assert!(matches!(failed, SessionEvent::SaveFailed { message } if message.contains("disk full")));

    let id = session
        .record(EventDraft::shot(1, ShotOutcome::Goal))
        .await
        .expect("record after failed save");
    assert_eq!(session.score(1, None).await.expect("score").goals, 1);
    assert!(session.chronological().await.expect("events").iter().any(|e| e.id == id));

    let _ = session.shutdown().await;
}

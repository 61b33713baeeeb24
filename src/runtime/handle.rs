use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};
use tracing::{info, warn};

use crate::{
    core::{
        aggregate::{Match, MatchSnapshotV1},
        error::MatchError,
    },
    engine::{
        score::ScoreLine,
        summary::{MatchSummary, summarize},
    },
    event::{EventDraft, EventPatch, EventRecord},
    persist::{MatchRepository, PersistError},
    types::{EventId, MatchPeriod, TeamId},
};

use super::events::SessionEvent;

/// Errors returned by a [`MatchSession`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Rejected by the match.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// Save failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Session task has stopped.
    #[error("session channel closed")]
    ChannelClosed,
}

/// Session tuning.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Hand a snapshot to the repository after every mutation.
    pub autosave: bool,
    /// Snapshots arriving within this window are coalesced into one save.
    pub save_latency_ms: u64,
    /// Pending saves the worker may queue.
    pub persist_queue_bound: usize,
    /// Pending commands the session may queue.
    pub command_queue_bound: usize,
    /// Change events retained for slow subscribers.
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            autosave: true,
            save_latency_ms: 250,
            persist_queue_bound: 16,
            command_queue_bound: 256,
            event_buffer: 1024,
        }
    }
}

/// Clock state as a display collaborator reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockStatus {
    /// Current period.
    pub period: MatchPeriod,
    /// True when the clock is stopped.
    pub is_paused: bool,
    /// Elapsed seconds in the period.
    pub elapsed_secs: u32,
}

/// Cloneable handle to a match owned by one session task.
#[derive(Clone)]
pub struct MatchSession {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<SessionEvent>,
}

type Reply<T> = oneshot::Sender<Result<T, RuntimeError>>;

enum Command {
    StartPeriod { resp: Reply<EventId> },
    EndPeriod { resp: Reply<EventId> },
    Pause { resp: Reply<bool> },
    Resume { resp: Reply<bool> },
    Suspend { resp: Reply<bool> },
    Reconcile { resp: Reply<bool> },
    Reset { resp: Reply<()> },
    Record { draft: EventDraft, resp: Reply<EventId> },
    Edit { id: EventId, patch: EventPatch, resp: Reply<()> },
    Delete { id: EventId, resp: Reply<EventRecord> },
    Undo { resp: Reply<EventId> },
    Redo { resp: Reply<EventId> },
    Status { resp: Reply<ClockStatus> },
    Score { team: TeamId, cutoff: Option<EventId>, resp: Reply<ScoreLine> },
    Chronological { resp: Reply<Vec<EventRecord>> },
    RecentFirst { resp: Reply<Vec<EventRecord>> },
    Summary { resp: Reply<MatchSummary> },
    Snapshot { resp: Reply<MatchSnapshotV1> },
    Save { resp: Reply<()> },
    Shutdown { resp: Reply<()> },
}

enum PersistMsg {
    Snapshot(MatchSnapshotV1),
    SaveNow {
        snapshot: MatchSnapshotV1,
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
}

type SharedRepo = Arc<Mutex<Box<dyn MatchRepository>>>;

/// Spawns the task that owns `m` and returns a handle to it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(
    m: Match,
    repo: Option<Box<dyn MatchRepository>>,
    config: RuntimeConfig,
) -> MatchSession {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<SessionEvent>(config.event_buffer);

    let (persist_tx_opt, mut saved_rx) = if let Some(repo) = repo {
        let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound);
        let (saved_tx, saved_rx) = mpsc::unbounded_channel::<Result<(), String>>();
        spawn_persistence_worker(Arc::new(Mutex::new(repo)), persist_rx, saved_tx, config.clone());
        (Some(persist_tx), Some(saved_rx))
    } else {
        (None, None)
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut m = m;
        info!(match_id = m.id(), "session started");

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    let done = handle_command(
                        cmd,
                        &mut m,
                        &events_tx_loop,
                        persist_tx_opt.as_ref(),
                        &config,
                    ).await;
                    if done {
                        break;
                    }
                }
                Some(saved) = recv_save_status(&mut saved_rx) => {
                    let event = match saved {
                        Ok(()) => SessionEvent::Saved,
                        Err(message) => SessionEvent::SaveFailed { message },
                    };
                    let _ = events_tx_loop.send(event);
                }
            }
        }
        info!(match_id = m.id(), "session stopped");
    });

    MatchSession { cmd_tx, events_tx }
}

impl MatchSession {
    /// Receives every change the session applies.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Starts the next play period.
    pub async fn start_period(&self) -> Result<EventId, RuntimeError> {
        self.request(|resp| Command::StartPeriod { resp }).await
    }

    /// Ends the running period.
    pub async fn end_period(&self) -> Result<EventId, RuntimeError> {
        self.request(|resp| Command::EndPeriod { resp }).await
    }

    /// Pauses; `false` when already paused.
    pub async fn pause(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::Pause { resp }).await
    }

    /// Resumes; `false` when not paused.
    pub async fn resume(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::Resume { resp }).await
    }

    /// Bookmarks a host suspension.
    pub async fn suspend(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::Suspend { resp }).await
    }

    /// Folds suspended time out of play.
    pub async fn reconcile(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::Reconcile { resp }).await
    }

    /// Returns the clock to `NotStarted`.
    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Reset { resp }).await
    }

    /// Records an event at the current match time.
    pub async fn record(&self, draft: EventDraft) -> Result<EventId, RuntimeError> {
        self.request(|resp| Command::Record { draft, resp }).await
    }

    /// Edits event `id`.
    pub async fn edit(&self, id: EventId, patch: EventPatch) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Edit { id, patch, resp }).await
    }

    /// Deletes event `id`.
    pub async fn delete(&self, id: EventId) -> Result<EventRecord, RuntimeError> {
        self.request(|resp| Command::Delete { id, resp }).await
    }

    /// Reverts the latest change.
    pub async fn undo(&self) -> Result<EventId, RuntimeError> {
        self.request(|resp| Command::Undo { resp }).await
    }

    /// Reapplies the latest undone change.
    pub async fn redo(&self) -> Result<EventId, RuntimeError> {
        self.request(|resp| Command::Redo { resp }).await
    }

    /// Clock state for display.
    pub async fn status(&self) -> Result<ClockStatus, RuntimeError> {
        self.request(|resp| Command::Status { resp }).await
    }

    /// Score of `team`, optionally as of event `cutoff`.
    pub async fn score(
        &self,
        team: TeamId,
        cutoff: Option<EventId>,
    ) -> Result<ScoreLine, RuntimeError> {
        self.request(|resp| Command::Score { team, cutoff, resp }).await
    }

    /// Events in match-time order.
    pub async fn chronological(&self) -> Result<Vec<EventRecord>, RuntimeError> {
        self.request(|resp| Command::Chronological { resp }).await
    }

    /// Events newest first.
    pub async fn recent_first(&self) -> Result<Vec<EventRecord>, RuntimeError> {
        self.request(|resp| Command::RecentFirst { resp }).await
    }

    /// Per-team statistics.
    pub async fn summary(&self) -> Result<MatchSummary, RuntimeError> {
        self.request(|resp| Command::Summary { resp }).await
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Result<MatchSnapshotV1, RuntimeError> {
        self.request(|resp| Command::Snapshot { resp }).await
    }

    /// Saves the current state immediately and reports the outcome.
    pub async fn save(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Save { resp }).await
    }

    /// Flushes pending saves and stops the session task.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }
}

async fn handle_command(
    cmd: Command,
    m: &mut Match,
    events_tx: &broadcast::Sender<SessionEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
    config: &RuntimeConfig,
) -> bool {
    let notify = |event: SessionEvent, m: &mut Match| {
        let _ = events_tx.send(event);
        if config.autosave {
            if let Some(tx) = persist_tx {
                enqueue_snapshot(tx, m, events_tx);
            }
        }
    };

    match cmd {
        Command::StartPeriod { resp } => {
            let res = m.start_period();
            if res.is_ok() {
                notify(SessionEvent::PeriodStarted { period: m.period() }, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::EndPeriod { resp } => {
            let res = m.end_period();
            if let Ok(id) = res {
                let ended = m.log().get(id).map(|e| (e.period, e.elapsed_secs));
                if let Some((period, elapsed_secs)) = ended {
                    notify(SessionEvent::PeriodEnded { period, elapsed_secs }, m);
                }
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Pause { resp } => {
            let res = m.pause();
            if res == Ok(true) {
                notify(SessionEvent::Paused, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Resume { resp } => {
            let res = m.resume();
            if res == Ok(true) {
                notify(SessionEvent::Resumed, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Suspend { resp } => {
            let taken = m.suspend();
            if taken {
                notify(SessionEvent::Suspended, m);
            }
            let _ = resp.send(Ok(taken));
        }
        Command::Reconcile { resp } => {
            let folded = m.reconcile();
            if folded {
                notify(SessionEvent::Reconciled, m);
            }
            let _ = resp.send(Ok(folded));
        }
        Command::Reset { resp } => {
            m.reset();
            notify(SessionEvent::Reset, m);
            let _ = resp.send(Ok(()));
        }
        Command::Record { draft, resp } => {
            let res = m.record(draft);
            if let Ok(id) = res {
                notify(SessionEvent::Recorded { id }, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Edit { id, patch, resp } => {
            let res = m.edit(id, &patch);
            if res.is_ok() {
                notify(SessionEvent::Edited { id }, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Delete { id, resp } => {
            let res = m.delete(id);
            if res.is_ok() {
                notify(SessionEvent::Deleted { id }, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Undo { resp } => {
            let res = m.undo();
            if let Ok(id) = res {
                notify(SessionEvent::UndoApplied { id }, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Redo { resp } => {
            let res = m.redo();
            if let Ok(id) = res {
                notify(SessionEvent::RedoApplied { id }, m);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Status { resp } => {
            let _ = resp.send(Ok(ClockStatus {
                period: m.period(),
                is_paused: m.is_paused(),
                elapsed_secs: m.elapsed_secs(),
            }));
        }
        Command::Score { team, cutoff, resp } => {
            let res = match cutoff {
                Some(id) => m.score_as_of(team, id),
                None => Ok(m.score(team)),
            };
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Chronological { resp } => {
            let _ = resp.send(Ok(m.chronological().cloned().collect()));
        }
        Command::RecentFirst { resp } => {
            let _ = resp.send(Ok(m.recent_first().cloned().collect()));
        }
        Command::Summary { resp } => {
            let _ = resp.send(Ok(summarize(m)));
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(Ok(m.export_snapshot()));
        }
        Command::Save { resp } => {
            let out = match persist_tx {
                Some(tx) => {
                    let (save_tx, save_rx) = oneshot::channel();
                    let msg = PersistMsg::SaveNow {
                        snapshot: m.export_snapshot(),
                        resp: save_tx,
                    };
                    if tx.send(msg).await.is_err() {
                        Err(RuntimeError::ChannelClosed)
                    } else {
                        save_rx
                            .await
                            .map_err(|_| RuntimeError::ChannelClosed)
                            .and_then(|r| r.map_err(RuntimeError::from))
                    }
                }
                None => Err(RuntimeError::Persist(PersistError::Message(
                    "no repository configured".to_string(),
                ))),
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = match persist_tx {
                Some(tx) => {
                    let (done_tx, done_rx) = oneshot::channel();
                    if tx.send(PersistMsg::Shutdown { resp: done_tx }).await.is_err() {
                        Err(RuntimeError::ChannelClosed)
                    } else {
                        done_rx
                            .await
                            .map_err(|_| RuntimeError::ChannelClosed)
                            .and_then(|r| r.map_err(RuntimeError::from))
                    }
                }
                None => Ok(()),
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

async fn recv_save_status(
    rx: &mut Option<mpsc::UnboundedReceiver<Result<(), String>>>,
) -> Option<Result<(), String>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn enqueue_snapshot(
    tx: &mpsc::Sender<PersistMsg>,
    m: &mut Match,
    events_tx: &broadcast::Sender<SessionEvent>,
) {
    if let Err(err) = tx.try_send(PersistMsg::Snapshot(m.export_snapshot())) {
        // The next mutation enqueues a complete snapshot again.
        warn!(match_id = m.id(), %err, "persist queue rejected snapshot");
        let _ = events_tx.send(SessionEvent::SaveFailed {
            message: format!("persist queue error: {err}"),
        });
    }
}

fn spawn_persistence_worker(
    repo: SharedRepo,
    mut rx: mpsc::Receiver<PersistMsg>,
    saved_tx: mpsc::UnboundedSender<Result<(), String>>,
    config: RuntimeConfig,
) {
    tokio::spawn(async move {
        let latency = Duration::from_millis(config.save_latency_ms);
        let mut pending: Option<MatchSnapshotV1> = None;
        let mut deadline = Instant::now() + latency;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = flush_pending(&repo, &mut pending, &saved_tx).await;
                        break;
                    };

                    match msg {
                        PersistMsg::Snapshot(snapshot) => {
                            if pending.is_none() {
                                deadline = Instant::now() + latency;
                            }
                            pending = Some(snapshot);
                            if config.save_latency_ms == 0 {
                                let _ = flush_pending(&repo, &mut pending, &saved_tx).await;
                            }
                        }
                        PersistMsg::SaveNow { snapshot, resp } => {
                            pending = Some(snapshot);
                            let _ = resp.send(flush_pending(&repo, &mut pending, &saved_tx).await);
                        }
                        PersistMsg::Shutdown { resp } => {
                            let _ = resp.send(flush_pending(&repo, &mut pending, &saved_tx).await);
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    let _ = flush_pending(&repo, &mut pending, &saved_tx).await;
                }
            }
        }
    });
}

async fn flush_pending(
    repo: &SharedRepo,
    pending: &mut Option<MatchSnapshotV1>,
    saved_tx: &mpsc::UnboundedSender<Result<(), String>>,
) -> Result<(), PersistError> {
    let Some(snapshot) = pending.take() else {
        return Ok(());
    };

    let repo_ref = Arc::clone(repo);
    let res = tokio::task::spawn_blocking(move || {
        let mut repo = repo_ref.blocking_lock();
        repo.save(&snapshot)
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))
    .and_then(|r| r);

    match &res {
        Ok(()) => {
            let _ = saved_tx.send(Ok(()));
        }
        Err(err) => {
            warn!(%err, "match save failed");
            let _ = saved_tx.send(Err(err.to_string()));
        }
    }
    res
}

// Board API worker - owns the HTTP client and executes UI commands
//
// The TUI task never performs network IO. It sends ApiCommands over a
// bounded channel; this task runs them and answers with UiEvents. The
// reconciliation policy lives here:
// - delete: reload only on success; on failure the row stays revealed and
//   the UI gets an alert (no retry)
// - reorder, completion toggles, habit counters: reload on success AND
//   failure, so the display always converges on the server's truth
//
// Demo mode swaps the HTTP client for an in-memory store serving the same
// channel, so the whole interaction layer runs without a server.

use tokio::sync::mpsc;

use crate::api::models::{RowId, RowKind, Snapshot};
use crate::api::ApiClient;
use crate::interaction::reorder::{ReorderCommit, ReorderTarget};

/// Commands the UI sends to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCommand {
    /// Full refetch of the board state.
    Reload,
    /// Commit a swipe-delete.
    Delete { kind: RowKind, id: RowId },
    /// Persist a reordered container.
    PersistOrder(ReorderCommit),
    /// Habit counter +1 / -1.
    StepHabit { id: i64, delta: i32 },
    /// Mark a mission/goal/sub-goal complete or incomplete.
    SetDone { kind: RowKind, id: i64, done: bool },
}

/// Events the worker sends back to the UI.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Fresh authoritative state; supersedes all provisional local state.
    Snapshot(Snapshot),
    /// A reload failed; the UI keeps what it has.
    LoadFailed(String),
    /// A delete failed; the row stays revealed and the user is alerted.
    DeleteFailed { kind: RowKind, message: String },
    /// Informational toast.
    Notice(String),
}

/// Run the worker against the real API until the command channel closes.
pub async fn run(
    client: ApiClient,
    user_id: i64,
    mut commands: mpsc::Receiver<ApiCommand>,
    events: mpsc::Sender<UiEvent>,
) {
    while let Some(cmd) = commands.recv().await {
        match cmd {
            ApiCommand::Reload => reload(&client, user_id, &events).await,
            ApiCommand::Delete { kind, id } => match client.delete_row(kind, &id).await {
                Ok(()) => {
                    tracing::info!(%kind, %id, "deleted row");
                    reload(&client, user_id, &events).await;
                }
                Err(e) => {
                    tracing::warn!(%kind, %id, error = %e, "delete failed");
                    let _ = events
                        .send(UiEvent::DeleteFailed {
                            kind,
                            message: format!("Could not delete {kind}"),
                        })
                        .await;
                }
            },
            ApiCommand::PersistOrder(commit) => {
                if let Err(e) = client.persist_order(user_id, &commit).await {
                    tracing::warn!(error = %e, "order persist failed, restoring server order");
                    let _ = events
                        .send(UiEvent::Notice("Reorder failed, restoring order".into()))
                        .await;
                }
                reload(&client, user_id, &events).await;
            }
            ApiCommand::StepHabit { id, delta } => {
                match client.step_habit(id, delta).await {
                    Ok(count) => tracing::debug!(habit = id, count, "habit counter updated"),
                    Err(e) => {
                        tracing::warn!(habit = id, error = %e, "habit step failed");
                        let _ = events
                            .send(UiEvent::Notice("Could not update habit".into()))
                            .await;
                    }
                }
                reload(&client, user_id, &events).await;
            }
            ApiCommand::SetDone { kind, id, done } => {
                if let Err(e) = client.set_done(kind, id, done).await {
                    tracing::warn!(%kind, id, error = %e, "completion toggle failed");
                    let _ = events
                        .send(UiEvent::Notice("Could not update status".into()))
                        .await;
                }
                reload(&client, user_id, &events).await;
            }
        }
    }
    tracing::debug!("command channel closed, worker exiting");
}

async fn reload(client: &ApiClient, user_id: i64, events: &mpsc::Sender<UiEvent>) {
    match client.fetch_snapshot(user_id).await {
        Ok(snapshot) => {
            let _ = events.send(UiEvent::Snapshot(snapshot)).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "reload failed");
            let _ = events.send(UiEvent::LoadFailed(e.to_string())).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Demo mode
// ---------------------------------------------------------------------------

/// In-memory board used by `--demo`: applies the same commands a real server
/// would and answers every mutation with a fresh snapshot, exactly like the
/// reconciliation-by-refetch flow.
pub struct DemoStore {
    state: Snapshot,
}

impl DemoStore {
    pub fn seeded() -> Self {
        use crate::api::models::{Goal, Habit, Mission, Subgoal};

        let missions: Vec<Mission> = serde_json::from_value(serde_json::json!([
            {"id": 1, "title": "Run a marathon", "description": "Under 4 hours", "is_completed": 0},
            {"id": 2, "title": "Learn woodworking", "description": "Build a bookshelf", "is_completed": 0},
        ]))
        .unwrap();
        let goals: Vec<Goal> = serde_json::from_value(serde_json::json!([
            {"id": 10, "title": "Read 12 books", "priority": 2, "is_completed": 0},
            {"id": 11, "title": "Ship the side project", "priority": 3, "is_completed": 0},
            {"id": 12, "title": "Inbox zero", "priority": 1, "is_completed": 1},
        ]))
        .unwrap();
        let habits: Vec<Habit> = serde_json::from_value(serde_json::json!([
            {"id": 42, "title": "Morning stretch", "today_count": 1, "streak": 6},
            {"id": 43, "title": "No sugar", "today_count": 0, "streak": 2},
        ]))
        .unwrap();
        let subgoals: Vec<Subgoal> = serde_json::from_value(serde_json::json!([
            {"id": 100, "mission_id": 1, "title": "Run 10k", "is_completed": 1},
            {"id": 101, "mission_id": 1, "title": "Run a half marathon", "is_completed": 0},
        ]))
        .unwrap();

        let mut state = Snapshot {
            missions,
            goals,
            habits,
            ..Default::default()
        };
        state.subgoals.insert(1, subgoals);
        state.subgoals.insert(2, Vec::new());
        Self { state }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    fn delete(&mut self, kind: RowKind, id: &RowId) {
        let Some(id) = id.as_int() else { return };
        match kind {
            RowKind::Mission => {
                self.state.missions.retain(|m| m.id != id);
                self.state.subgoals.remove(&id);
            }
            RowKind::Goal => self.state.goals.retain(|g| g.id != id),
            RowKind::Habit => self.state.habits.retain(|h| h.id != id),
            RowKind::Subgoal => {
                for subs in self.state.subgoals.values_mut() {
                    subs.retain(|s| s.id != id);
                }
            }
        }
    }

    fn reorder(&mut self, commit: &ReorderCommit) {
        fn apply<T>(rows: &mut Vec<T>, ids: &[i64], id_of: impl Fn(&T) -> i64) {
            rows.sort_by_key(|row| {
                ids.iter()
                    .position(|id| *id == id_of(row))
                    .unwrap_or(usize::MAX)
            });
        }
        match commit.target {
            ReorderTarget::Missions => apply(&mut self.state.missions, &commit.ids, |m| m.id),
            ReorderTarget::Goals => apply(&mut self.state.goals, &commit.ids, |g| g.id),
            ReorderTarget::Habits => apply(&mut self.state.habits, &commit.ids, |h| h.id),
            ReorderTarget::Subgoals { mission_id } => {
                if let Some(subs) = self.state.subgoals.get_mut(&mission_id) {
                    apply(subs, &commit.ids, |s| s.id);
                }
            }
        }
    }

    fn step_habit(&mut self, id: i64, delta: i32) {
        if let Some(h) = self.state.habits.iter_mut().find(|h| h.id == id) {
            h.today_count = (h.today_count + i64::from(delta)).max(0);
        }
    }

    fn set_done(&mut self, kind: RowKind, id: i64, done: bool) {
        match kind {
            RowKind::Mission => {
                if let Some(m) = self.state.missions.iter_mut().find(|m| m.id == id) {
                    m.is_completed = done;
                }
            }
            RowKind::Goal => {
                if let Some(g) = self.state.goals.iter_mut().find(|g| g.id == id) {
                    g.is_completed = done;
                }
            }
            RowKind::Subgoal => {
                for subs in self.state.subgoals.values_mut() {
                    if let Some(s) = subs.iter_mut().find(|s| s.id == id) {
                        s.is_completed = done;
                    }
                }
            }
            RowKind::Habit => {}
        }
    }

    fn apply(&mut self, cmd: &ApiCommand) {
        match cmd {
            ApiCommand::Reload => {}
            ApiCommand::Delete { kind, id } => self.delete(*kind, id),
            ApiCommand::PersistOrder(commit) => self.reorder(commit),
            ApiCommand::StepHabit { id, delta } => self.step_habit(*id, *delta),
            ApiCommand::SetDone { kind, id, done } => self.set_done(*kind, *id, *done),
        }
    }
}

/// Serve the command channel from an in-memory store.
pub async fn run_demo(mut commands: mpsc::Receiver<ApiCommand>, events: mpsc::Sender<UiEvent>) {
    tracing::info!("demo mode: serving an in-memory board");
    let mut store = DemoStore::seeded();
    while let Some(cmd) = commands.recv().await {
        store.apply(&cmd);
        let _ = events.send(UiEvent::Snapshot(store.snapshot())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_delete_removes_the_row_from_the_next_snapshot() {
        let mut store = DemoStore::seeded();
        assert!(store.snapshot().habits.iter().any(|h| h.id == 42));
        store.apply(&ApiCommand::Delete {
            kind: RowKind::Habit,
            id: RowId::from(42),
        });
        assert!(!store.snapshot().habits.iter().any(|h| h.id == 42));
    }

    #[test]
    fn demo_reorder_matches_the_committed_sequence() {
        let mut store = DemoStore::seeded();
        store.apply(&ApiCommand::PersistOrder(ReorderCommit {
            target: ReorderTarget::Goals,
            ids: vec![11, 10, 12],
        }));
        let ids: Vec<i64> = store.snapshot().goals.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![11, 10, 12]);
    }

    #[test]
    fn demo_habit_counter_never_goes_negative() {
        let mut store = DemoStore::seeded();
        for _ in 0..5 {
            store.apply(&ApiCommand::StepHabit { id: 43, delta: -1 });
        }
        assert_eq!(
            store
                .snapshot()
                .habits
                .iter()
                .find(|h| h.id == 43)
                .unwrap()
                .today_count,
            0
        );
    }

    #[tokio::test]
    async fn failed_order_persist_still_attempts_a_reload() {
        // Nothing listens on discard; the connection is refused immediately.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ev_tx, mut ev_rx) = mpsc::channel(8);
        let handle = tokio::spawn(run(client, 1, cmd_rx, ev_tx));

        cmd_tx
            .send(ApiCommand::PersistOrder(ReorderCommit {
                target: ReorderTarget::Goals,
                ids: vec![2, 1],
            }))
            .await
            .unwrap();

        // The failed commit raises a notice...
        let UiEvent::Notice(message) = ev_rx.recv().await.unwrap() else {
            panic!("expected a notice for the failed commit");
        };
        assert!(message.contains("Reorder failed"));

        // ...and the reconciliation reload still runs. It fails against the
        // same dead server, which is exactly the proof it was attempted.
        let UiEvent::LoadFailed(_) = ev_rx.recv().await.unwrap() else {
            panic!("expected the follow-up reload to be attempted");
        };

        drop(cmd_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn demo_worker_answers_every_command_with_a_snapshot() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ev_tx, mut ev_rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_demo(cmd_rx, ev_tx));

        cmd_tx.send(ApiCommand::Reload).await.unwrap();
        let UiEvent::Snapshot(first) = ev_rx.recv().await.unwrap() else {
            panic!("expected snapshot");
        };
        assert!(first.habits.iter().any(|h| h.id == 42));

        cmd_tx
            .send(ApiCommand::Delete {
                kind: RowKind::Habit,
                id: RowId::from(42),
            })
            .await
            .unwrap();
        let UiEvent::Snapshot(second) = ev_rx.recv().await.unwrap() else {
            panic!("expected snapshot");
        };
        assert!(!second.habits.iter().any(|h| h.id == 42));

        drop(cmd_tx);
        handle.await.unwrap();
    }
}

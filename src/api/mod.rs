// Board API client
//
// Thin reqwest wrapper around the remote life-planner API. Paths and order
// payloads are built by pure helpers so the wire format stays testable
// without a server. Every call maps HTTP errors into anyhow with enough
// context to be actionable in the log pane.

pub mod models;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::interaction::reorder::{ReorderCommit, ReorderTarget};
use models::{Goal, Habit, Mission, RowId, RowKind, Snapshot, Subgoal};

/// Path for a swipe-delete commit, scoped by row kind.
pub fn delete_path(kind: RowKind, id: &RowId) -> String {
    format!("/api/{}/{}", kind.collection(), id)
}

/// Path and JSON body for an order-persist request. Top-level lists are
/// scoped by user, sub-goal lists by their owning mission.
pub fn order_request(user_id: i64, commit: &ReorderCommit) -> (String, Value) {
    match commit.target {
        ReorderTarget::Missions => (
            format!("/api/user/{user_id}/missions/order"),
            json!({ "mission_ids": commit.ids }),
        ),
        ReorderTarget::Goals => (
            format!("/api/user/{user_id}/goals/order"),
            json!({ "goal_ids": commit.ids }),
        ),
        ReorderTarget::Habits => (
            format!("/api/user/{user_id}/habits/order"),
            json!({ "habit_ids": commit.ids }),
        ),
        ReorderTarget::Subgoals { mission_id } => (
            format!("/api/mission/{mission_id}/subgoals/order"),
            json!({ "subgoal_ids": commit.ids }),
        ),
    }
}

/// Path toggling completion for one row.
pub fn done_path(kind: RowKind, id: i64, done: bool) -> String {
    let verb = if done { "complete" } else { "uncomplete" };
    format!("/api/{}/{}/{}", kind.collection(), id, verb)
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve the acting user when no user id is configured.
    pub async fn me(&self) -> Result<i64> {
        #[derive(Deserialize)]
        struct Me {
            user_id: i64,
        }
        let me: Me = self
            .http
            .get(self.url("/api/me"))
            .send()
            .await
            .context("GET /api/me failed")?
            .error_for_status()
            .context("GET /api/me returned an error status")?
            .json()
            .await
            .context("GET /api/me returned malformed JSON")?;
        Ok(me.user_id)
    }

    /// Fetch the full board state: the three top-level lists plus every
    /// mission's sub-goals. This is the reconciliation step that follows
    /// every mutation.
    pub async fn fetch_snapshot(&self, user_id: i64) -> Result<Snapshot> {
        let missions: Vec<Mission> = self
            .get_json(&format!("/api/user/{user_id}/missions"))
            .await?;
        let goals: Vec<Goal> = self.get_json(&format!("/api/user/{user_id}/goals")).await?;
        let habits: Vec<Habit> = self
            .get_json(&format!("/api/user/{user_id}/habits"))
            .await?;

        let mut subgoals = HashMap::new();
        for mission in &missions {
            let subs: Vec<Subgoal> = self
                .get_json(&format!("/api/mission/{}/subgoals", mission.id))
                .await?;
            subgoals.insert(mission.id, subs);
        }

        Ok(Snapshot {
            missions,
            goals,
            habits,
            subgoals,
        })
    }

    /// Commit a swipe-delete.
    pub async fn delete_row(&self, kind: RowKind, id: &RowId) -> Result<()> {
        let path = delete_path(kind, id);
        self.http
            .delete(self.url(&path))
            .send()
            .await
            .with_context(|| format!("DELETE {path} failed"))?
            .error_for_status()
            .with_context(|| format!("DELETE {path} returned an error status"))?;
        Ok(())
    }

    /// Persist a reordered list.
    pub async fn persist_order(&self, user_id: i64, commit: &ReorderCommit) -> Result<()> {
        let (path, body) = order_request(user_id, commit);
        self.http
            .put(self.url(&path))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("PUT {path} failed"))?
            .error_for_status()
            .with_context(|| format!("PUT {path} returned an error status"))?;
        Ok(())
    }

    /// Increment (delta > 0) or decrement a habit's daily counter.
    /// Returns the counter value the server settled on.
    pub async fn step_habit(&self, habit_id: i64, delta: i32) -> Result<i64> {
        #[derive(Deserialize)]
        struct Count {
            count: i64,
        }
        let verb = if delta >= 0 { "increment" } else { "decrement" };
        let path = format!("/api/habits/{habit_id}/{verb}");
        let count: Count = self
            .http
            .post(self.url(&path))
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {path} returned an error status"))?
            .json()
            .await
            .with_context(|| format!("POST {path} returned malformed JSON"))?;
        Ok(count.count)
    }

    /// Mark a mission, goal, or sub-goal complete or incomplete.
    pub async fn set_done(&self, kind: RowKind, id: i64, done: bool) -> Result<()> {
        let path = done_path(kind, id, done);
        self.http
            .post(self.url(&path))
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {path} returned an error status"))?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {path} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {path} returned an error status"))?
            .json()
            .await
            .with_context(|| format!("GET {path} returned malformed JSON"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_paths_are_scoped_by_kind() {
        assert_eq!(
            delete_path(RowKind::Habit, &RowId::from(42)),
            "/api/habits/42"
        );
        assert_eq!(
            delete_path(RowKind::Mission, &RowId::from(7)),
            "/api/missions/7"
        );
        assert_eq!(delete_path(RowKind::Goal, &RowId::from(3)), "/api/goals/3");
    }

    #[test]
    fn order_payload_key_matches_the_list_kind() {
        let commit = ReorderCommit {
            target: ReorderTarget::Goals,
            ids: vec![2, 1, 3],
        };
        let (path, body) = order_request(10, &commit);
        assert_eq!(path, "/api/user/10/goals/order");
        assert_eq!(body, json!({ "goal_ids": [2, 1, 3] }));

        let commit = ReorderCommit {
            target: ReorderTarget::Habits,
            ids: vec![9],
        };
        let (_, body) = order_request(10, &commit);
        assert_eq!(body, json!({ "habit_ids": [9] }));
    }

    #[test]
    fn subgoal_order_is_scoped_by_mission() {
        let commit = ReorderCommit {
            target: ReorderTarget::Subgoals { mission_id: 12 },
            ids: vec![6, 5],
        };
        let (path, body) = order_request(999, &commit);
        assert_eq!(path, "/api/mission/12/subgoals/order");
        assert_eq!(body, json!({ "subgoal_ids": [6, 5] }));
    }

    #[test]
    fn done_paths_pick_the_right_verb() {
        assert_eq!(done_path(RowKind::Goal, 3, true), "/api/goals/3/complete");
        assert_eq!(
            done_path(RowKind::Subgoal, 8, false),
            "/api/subgoals/8/uncomplete"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/api/me"), "http://localhost:8000/api/me");
    }
}
